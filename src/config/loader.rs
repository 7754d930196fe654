use super::{Config, InferenceBackend};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

const CONFIG_FILE_NAME: &str = "config.toml";

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rollup-llm").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Config {
    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// read when present and built-in defaults are used otherwise. Environment
    /// overrides are applied last, then the result is validated.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        validate_http_url("rollup.server_url", &self.rollup.server_url)?;
        if self.inference.backend == InferenceBackend::Remote {
            validate_http_url("inference.url", &self.inference.url)?;
        }

        if self.rollup.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "rollup.request_timeout_secs must be >= 1".into(),
            ));
        }
        if self.inference.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "inference.timeout_secs must be >= 1".into(),
            ));
        }
        if self.rollup.initial_backoff_ms > self.rollup.max_backoff_ms {
            return Err(ConfigError::Validation(format!(
                "rollup.initial_backoff_ms ({}) must be <= rollup.max_backoff_ms ({})",
                self.rollup.initial_backoff_ms, self.rollup.max_backoff_ms
            )));
        }
        if self.inference.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "inference.max_tokens must be >= 1".into(),
            ));
        }
        if self.inference.context_size == 0 {
            return Err(ConfigError::Validation(
                "inference.context_size must be >= 1".into(),
            ));
        }
        if tracing::Level::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Validation(format!(
                "log_level '{}' is not one of trace, debug, info, warn, error",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

fn validate_http_url(field: &str, raw: &str) -> std::result::Result<(), ConfigError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ConfigError::Validation(format!("{field} '{raw}' is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "{field} must use http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(())
}
