use crate::config::Config;
use anyhow::Result;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

/// Resolve the configuration with a scoped warn-level subscriber, so
/// problems found while loading are reported before the real log level is
/// known.
pub fn load_config<W>(path: Option<&Path>, make_writer: W) -> Result<Config>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::with_default(bootstrap, || Config::load(path))
}

/// Install the process-wide subscriber at the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let level = Level::from_str(log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceBackend;
    use crate::config::test_env::{ENV_LOCK, EnvVarGuard};
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn invalid_backend_override_is_reported_while_loading() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _backend = EnvVarGuard::set("INFERENCE_BACKEND", "cloud-magic");
        let file = NamedTempFile::new().unwrap();

        let captured = Captured::default();
        let sink = captured.clone();
        let config = load_config(Some(file.path()), move || sink.clone()).unwrap();

        assert_eq!(config.inference.backend, InferenceBackend::Embedded);
        assert!(
            captured.text().contains("INFERENCE_BACKEND='cloud-magic'"),
            "got {:?}",
            captured.text()
        );
    }

    #[test]
    fn clean_load_stays_quiet() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _backend = EnvVarGuard::unset("INFERENCE_BACKEND");
        let file = NamedTempFile::new().unwrap();

        let captured = Captured::default();
        let sink = captured.clone();
        load_config(Some(file.path()), move || sink.clone()).unwrap();

        assert!(captured.text().is_empty(), "got {:?}", captured.text());
    }
}
