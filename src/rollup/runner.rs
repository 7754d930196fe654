//! The poll → dispatch → verdict loop.
//!
//! One request is in flight at a time. The verdict produced by the last
//! handler is the body of the next `/finish`; nothing else carries over
//! between iterations.

use super::backoff::Backoff;
use super::coordinator::{Coordinator, Exchange};
use super::types::Verdict;
use crate::config::RollupConfig;
#[cfg(test)]
use crate::error::CoordinatorError;
use crate::error::InferenceError;
use crate::handlers::Dispatcher;
use crate::inference::{InferenceAdapter, Readiness};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub ready_poll: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl From<&RollupConfig> for LoopSettings {
    fn from(config: &RollupConfig) -> Self {
        Self {
            ready_poll: Duration::from_millis(config.ready_poll_ms),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// Counters logged when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub processed: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub idle_polls: u64,
    pub failed_exchanges: u64,
}

impl LoopStats {
    fn record(&mut self, verdict: Verdict) {
        self.processed += 1;
        match verdict {
            Verdict::Accept => self.accepted += 1,
            Verdict::Reject => self.rejected += 1,
        }
    }
}

/// Result of one exchange with the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Idle,
    Processed(Verdict),
}

pub struct RollupRunner {
    coordinator: Arc<dyn Coordinator>,
    dispatcher: Dispatcher,
    inference: Arc<dyn InferenceAdapter>,
    settings: LoopSettings,
}

impl RollupRunner {
    pub fn new(
        coordinator: Arc<dyn Coordinator>,
        dispatcher: Dispatcher,
        inference: Arc<dyn InferenceAdapter>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            coordinator,
            dispatcher,
            inference,
            settings,
        }
    }

    /// Block until the inference backend is ready.
    ///
    /// Returns `Ok(false)` if cancelled first and an error if initialization
    /// failed, which is fatal for the process.
    pub async fn wait_until_ready(&self, cancel: &CancellationToken) -> Result<bool, InferenceError> {
        loop {
            match self.inference.readiness() {
                Readiness::Ready => return Ok(true),
                Readiness::Failed(message) => {
                    return Err(InferenceError::Init {
                        backend: self.inference.name().to_string(),
                        message,
                    });
                }
                Readiness::Loading => {
                    tracing::info!("Waiting for the model to initialize...");
                }
            }

            tokio::select! {
                () = cancel.cancelled() => return Ok(false),
                () = tokio::time::sleep(self.settings.ready_poll) => {}
            }
        }
    }

    #[cfg(test)]
    async fn poll_once(&self, verdict: Verdict) -> Result<PollOutcome, CoordinatorError> {
        let exchange = self.coordinator.finish(verdict).await?;
        Ok(self.process(exchange).await)
    }

    async fn process(&self, exchange: Exchange) -> PollOutcome {
        match exchange {
            Exchange::Idle => PollOutcome::Idle,
            Exchange::Request(body) => {
                let verdict = match self.dispatcher.dispatch(body).await {
                    Ok(verdict) => verdict,
                    Err(e) => {
                        tracing::warn!("Rejecting rollup request: {e}");
                        Verdict::Reject
                    }
                };
                PollOutcome::Processed(verdict)
            }
            Exchange::Malformed(reason) => {
                tracing::warn!("Rejecting unparseable rollup request: {reason}");
                PollOutcome::Processed(Verdict::Reject)
            }
        }
    }

    /// Run until `cancel` fires. A request already being handled is finished
    /// first; its verdict is reported on the next start.
    pub async fn run(&self, cancel: CancellationToken) -> Result<LoopStats, InferenceError> {
        let mut stats = LoopStats::default();
        if !self.wait_until_ready(&cancel).await? {
            return Ok(stats);
        }
        tracing::info!(backend = self.inference.name(), "Inference backend ready, polling coordinator");

        let mut verdict = Verdict::default();
        let mut backoff = Backoff::new(self.settings.initial_backoff, self.settings.max_backoff);

        loop {
            let exchange = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.coordinator.finish(verdict) => result,
            };

            match exchange {
                Ok(exchange) => match self.process(exchange).await {
                    PollOutcome::Processed(next) => {
                        stats.record(next);
                        tracing::info!(verdict = %next, "Request processed");
                        verdict = next;
                        backoff.reset();
                        continue;
                    }
                    PollOutcome::Idle => {
                        stats.idle_polls += 1;
                        tracing::debug!("No pending rollup request, trying again");
                    }
                },
                Err(e) => {
                    stats.failed_exchanges += 1;
                    tracing::warn!("Coordinator exchange failed, retrying: {e}");
                }
            }

            let delay = backoff.next_delay();
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(
            processed = stats.processed,
            accepted = stats.accepted,
            rejected = stats.rejected,
            idle_polls = stats.idle_polls,
            failed_exchanges = stats.failed_exchanges,
            "Rollup loop stopped"
        );
        Ok(stats)
    }
}
