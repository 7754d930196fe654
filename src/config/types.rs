use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was read from - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub rollup: RollupConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub gio: GioConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            rollup: RollupConfig::default(),
            inference: InferenceConfig::default(),
            gio: GioConfig::default(),
            log_level: default_log_level(),
        }
    }
}

// ── Coordinator ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Base URL of the rollup HTTP server (the coordinator)
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Per-request timeout for `/finish` and `/notice`
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// First sleep after an empty or failed exchange
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Ceiling for the doubling backoff
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Readiness poll interval while the inference backend initializes
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_ms: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5004".into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    5_000
}

fn default_ready_poll_ms() -> u64 {
    1_000
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            ready_poll_ms: default_ready_poll_ms(),
        }
    }
}

// ── Inference ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InferenceBackend {
    /// In-process model runtime
    Embedded,
    /// Remote OpenAI-style chat completion service
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_backend")]
    pub backend: InferenceBackend,
    /// Model artifact for the embedded backend (tilde-expanded)
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Base URL of the remote chat completion service
    #[serde(default = "default_inference_url")]
    pub url: String,
    /// Model name sent to the remote service
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_inference_timeout_secs")]
    pub timeout_secs: u64,
    /// Generation cap for the embedded backend
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Context window for the embedded backend
    #[serde(default = "default_context_size")]
    pub context_size: u32,
}

fn default_backend() -> InferenceBackend {
    InferenceBackend::Embedded
}

fn default_model_path() -> String {
    "models/model.gguf".into()
}

fn default_inference_url() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_model() -> String {
    "llama".into()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".into()
}

fn default_inference_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    256
}

fn default_context_size() -> u32 {
    2048
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model_path: default_model_path(),
            url: default_inference_url(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_inference_timeout_secs(),
            max_tokens: default_max_tokens(),
            context_size: default_context_size(),
        }
    }
}

impl InferenceConfig {
    pub fn expanded_model_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.model_path).into_owned())
    }
}

// ── GIO bridge ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GioConfig {
    #[serde(default = "default_gio_host")]
    pub host: String,
    #[serde(default = "default_gio_port")]
    pub port: u16,
    /// GIO domain used when forwarding chat completion bodies
    #[serde(default = "default_gio_domain")]
    pub domain: u16,
}

fn default_gio_host() -> String {
    "0.0.0.0".into()
}

fn default_gio_port() -> u16 {
    8080
}

fn default_gio_domain() -> u16 {
    0x2b
}

impl Default for GioConfig {
    fn default() -> Self {
        Self {
            host: default_gio_host(),
            port: default_gio_port(),
            domain: default_gio_domain(),
        }
    }
}
