use crate::config::{Config, InferenceBackend};

pub fn render_status(config: &Config) -> String {
    let config_source = config.config_path.as_ref().map_or_else(
        || "(built-in defaults)".to_string(),
        |path| path.display().to_string(),
    );

    let mut lines = vec![
        "◆ rollup-llm status".to_string(),
        String::new(),
        format!("Version      {}", env!("CARGO_PKG_VERSION")),
        format!("Config       {config_source}"),
        format!("Log level    {}", config.log_level),
        String::new(),
        format!("Coordinator  {}", config.rollup.server_url),
        format!(
            "  Backoff    {}ms .. {}ms",
            config.rollup.initial_backoff_ms, config.rollup.max_backoff_ms
        ),
        format!("  Timeout    {}s", config.rollup.request_timeout_secs),
        String::new(),
        format!("Inference    {}", config.inference.backend),
    ];

    match config.inference.backend {
        InferenceBackend::Embedded => {
            lines.push(format!(
                "  Model      {}",
                config.inference.expanded_model_path().display()
            ));
            lines.push(format!(
                "  Context    {} tokens (max {} generated)",
                config.inference.context_size, config.inference.max_tokens
            ));
            lines.push(format!(
                "  Runtime    {}",
                if cfg!(feature = "llama") {
                    "llama.cpp"
                } else {
                    "not compiled in (build with --features llama)"
                }
            ));
        }
        InferenceBackend::Remote => {
            lines.push(format!("  URL        {}", config.inference.url));
            lines.push(format!("  Model      {}", config.inference.model));
        }
    }
    lines.push(format!("  Timeout    {}s", config.inference.timeout_secs));

    lines.push(String::new());
    lines.push(format!(
        "GIO bridge   {}:{} (domain {:#x})",
        config.gio.host, config.gio.port, config.gio.domain
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_shows_embedded_model_path() {
        let status = render_status(&Config::default());
        assert!(status.contains("http://127.0.0.1:5004"));
        assert!(status.contains("embedded"));
        assert!(status.contains("models/model.gguf"));
        assert!(status.contains("(built-in defaults)"));
        assert!(status.contains("0x2b"));
    }

    #[test]
    fn status_shows_remote_url() {
        let mut config = Config::default();
        config.inference.backend = InferenceBackend::Remote;
        config.inference.url = "http://llm:9000".into();
        let status = render_status(&config);
        assert!(status.contains("remote"));
        assert!(status.contains("http://llm:9000"));
        assert!(!status.contains("models/model.gguf"));
    }
}
