use async_trait::async_trait;

/// Result of a notice publication. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    Failed(String),
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Publishes an already hex-encoded payload as a notice.
#[async_trait]
pub trait NoticeEmitter: Send + Sync {
    async fn publish(&self, payload: &str) -> PublishOutcome;
}
