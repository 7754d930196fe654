use std::time::Duration;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Failure of one advance request.
///
/// Every variant ends in a Reject verdict; subsystem errors keep their own
/// types below and convert in with `?`.
#[derive(Debug, Error)]
pub enum RollupLlmError {
    // ── Inference backend ───────────────────────────────────────────────
    #[error("inference: {0}")]
    Inference(#[from] InferenceError),

    // ── Payload validation ──────────────────────────────────────────────
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── Notice publication ──────────────────────────────────────────────
    #[error("notice was not published: {0}")]
    Notice(String),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Coordinator errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("{endpoint} answered with unexpected status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
}

// ─── Inference errors ───────────────────────────────────────────────────────

/// The single failure signal an inference backend hands back to a handler.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{backend} backend is not ready")]
    NotReady { backend: String },

    #[error("{backend} request failed: {message}")]
    Request { backend: String, message: String },

    #[error("{backend} returned a malformed response: {message}")]
    MalformedResponse { backend: String, message: String },

    #[error("{backend} timed out after {after:?}")]
    Timeout { backend: String, after: Duration },

    #[error("model error: {0}")]
    Model(String),

    #[error("failed to initialize {backend} backend: {message}")]
    Init { backend: String, message: String },
}

// ─── Dispatch errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unsupported request type '{0}'")]
    UnknownRequestType(String),

    #[error("malformed rollup request: {0}")]
    MalformedRequest(String),
}

// ─── Validation errors ──────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("payload field is missing")]
    MissingPayload,

    #[error("payload field must be a string, got {0}")]
    PayloadNotText(&'static str),

    #[error("payload is not valid hex: {0}")]
    InvalidHex(String),

    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}
