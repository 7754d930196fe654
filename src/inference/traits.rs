use crate::error::InferenceError;
use async_trait::async_trait;

/// Lifecycle of a backend as seen by the rollup runner during startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

#[async_trait]
pub trait InferenceAdapter: Send + Sync {
    /// Short backend label used in logs and errors.
    fn name(&self) -> &str;

    fn readiness(&self) -> Readiness;

    /// Produce one completion for `prompt`. Implementations do not retry.
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError>;
}
