use super::{Config, InferenceBackend};
use std::str::FromStr;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ROLLUP_HTTP_SERVER_URL")
            && !url.is_empty()
        {
            self.rollup.server_url = url;
        }

        if let Ok(path) = std::env::var("LLAMA_MODEL_PATH")
            && !path.is_empty()
        {
            self.inference.model_path = path;
        }

        if let Ok(raw) = std::env::var("INFERENCE_BACKEND") {
            match InferenceBackend::from_str(raw.trim()) {
                Ok(backend) => self.inference.backend = backend,
                Err(_) if raw.is_empty() => {}
                Err(_) => tracing::warn!("Ignoring INFERENCE_BACKEND='{raw}' (expected embedded or remote)"),
            }
        }

        if let Ok(url) = std::env::var("INFERENCE_URL")
            && !url.is_empty()
        {
            self.inference.url = url;
        }

        if let Ok(model) = std::env::var("INFERENCE_MODEL")
            && !model.is_empty()
        {
            self.inference.model = model;
        }

        if let Ok(prompt) = std::env::var("INFERENCE_SYSTEM_PROMPT")
            && !prompt.is_empty()
        {
            self.inference.system_prompt = prompt;
        }

        if let Ok(level) = std::env::var("ROLLUP_LLM_LOG_LEVEL")
            && !level.is_empty()
        {
            self.log_level = level;
        }
    }
}
