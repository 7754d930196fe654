use super::embedded::EmbeddedInference;
use super::remote::RemoteInference;
use super::traits::InferenceAdapter;
use crate::config::{InferenceBackend, InferenceConfig};
use crate::error::InferenceError;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured backend once at startup.
///
/// The embedded backend starts loading in the background; the runner waits
/// on `readiness()` before dispatching.
pub fn create_inference(config: &InferenceConfig) -> Result<Arc<dyn InferenceAdapter>, InferenceError> {
    match config.backend {
        InferenceBackend::Remote => {
            tracing::info!(url = %config.url, model = %config.model, "Using remote inference backend");
            Ok(Arc::new(RemoteInference::new(config)))
        }
        InferenceBackend::Embedded => {
            let model_path = config.expanded_model_path();
            tracing::info!(path = %model_path.display(), "Loading embedded model");
            let timeout = Duration::from_secs(config.timeout_secs);
            Ok(Arc::new(spawn_embedded(config, timeout)?))
        }
    }
}

#[cfg(feature = "llama")]
fn spawn_embedded(
    config: &InferenceConfig,
    timeout: Duration,
) -> Result<EmbeddedInference, InferenceError> {
    use super::embedded::ModelSession;
    use super::llama::LlamaSession;

    let model_path = config.expanded_model_path();
    let context_size = config.context_size;
    let max_tokens = config.max_tokens;
    let system_prompt = config.system_prompt.clone();
    EmbeddedInference::spawn(
        move || {
            LlamaSession::load(&model_path, context_size, max_tokens, system_prompt)
                .map(|session| Box::new(session) as Box<dyn ModelSession>)
        },
        timeout,
    )
}

#[cfg(not(feature = "llama"))]
fn spawn_embedded(
    _config: &InferenceConfig,
    _timeout: Duration,
) -> Result<EmbeddedInference, InferenceError> {
    Err(InferenceError::Init {
        backend: "embedded".into(),
        message: "this build has no in-process model runtime; rebuild with \
                  `--features llama` or set inference.backend = \"remote\""
            .into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_backend_is_created_ready() {
        let config = InferenceConfig {
            backend: InferenceBackend::Remote,
            url: "http://127.0.0.1:8080".into(),
            ..InferenceConfig::default()
        };
        let adapter = tokio_test::assert_ok!(create_inference(&config));
        assert_eq!(adapter.name(), "remote");
        assert!(adapter.readiness().is_ready());
    }

    #[cfg(not(feature = "llama"))]
    #[test]
    fn embedded_without_runtime_is_an_init_error() {
        let config = InferenceConfig::default();
        let err = match create_inference(&config) {
            Ok(_) => panic!("embedded backend should need the llama feature"),
            Err(err) => err,
        };
        assert!(matches!(err, InferenceError::Init { .. }));
        assert!(err.to_string().contains("--features llama"));
    }
}
