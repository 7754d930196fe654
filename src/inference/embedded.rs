//! In-process model backend.
//!
//! The model is loaded on a dedicated worker thread that owns the runtime and
//! its generation context for the life of the process. Prompts reach the
//! worker over a channel and completions come back on a oneshot, so the async
//! loop never blocks on generation. Readiness is published through a watch
//! channel while the model loads.

use super::traits::{InferenceAdapter, Readiness};
use crate::error::InferenceError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

const BACKEND: &str = "embedded";

/// A loaded model with its persistent generation context.
///
/// Lives on the worker thread only, so implementations need not be `Send`.
pub trait ModelSession {
    fn generate(&mut self, prompt: &str) -> Result<String, InferenceError>;
}

struct Job {
    prompt: String,
    reply: oneshot::Sender<Result<String, InferenceError>>,
}

pub struct EmbeddedInference {
    jobs: mpsc::Sender<Job>,
    state: watch::Receiver<Readiness>,
    timeout: Duration,
}

impl EmbeddedInference {
    /// Start the worker thread and begin loading with `load`.
    ///
    /// Returns immediately; callers observe progress through `readiness()`.
    pub fn spawn<F>(load: F, timeout: Duration) -> Result<Self, InferenceError>
    where
        F: FnOnce() -> Result<Box<dyn ModelSession>, InferenceError> + Send + 'static,
    {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>(1);
        let (state_tx, state_rx) = watch::channel(Readiness::Loading);

        std::thread::Builder::new()
            .name("inference-worker".into())
            .spawn(move || run_worker(load, jobs_rx, &state_tx))
            .map_err(|e| InferenceError::Init {
                backend: BACKEND.into(),
                message: format!("failed to start worker thread: {e}"),
            })?;

        Ok(Self {
            jobs: jobs_tx,
            state: state_rx,
            timeout,
        })
    }
}

fn run_worker<F>(load: F, mut jobs: mpsc::Receiver<Job>, state: &watch::Sender<Readiness>)
where
    F: FnOnce() -> Result<Box<dyn ModelSession>, InferenceError>,
{
    let mut session = match load() {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Error initializing model: {e}");
            state.send_replace(Readiness::Failed(e.to_string()));
            return;
        }
    };

    tracing::info!("Model loaded successfully");
    state.send_replace(Readiness::Ready);

    while let Some(job) = jobs.blocking_recv() {
        if job.reply.is_closed() {
            tracing::debug!("Skipping prompt abandoned by its caller");
            continue;
        }
        let result = session.generate(&job.prompt);
        if let Err(e) = &result {
            tracing::warn!("Error generating response: {e}");
        }
        // The caller may have timed out while generation ran.
        let _ = job.reply.send(result);
    }

    tracing::debug!("Inference worker shutting down");
}

#[async_trait]
impl InferenceAdapter for EmbeddedInference {
    fn name(&self) -> &str {
        BACKEND
    }

    fn readiness(&self) -> Readiness {
        self.state.borrow().clone()
    }

    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        if !self.readiness().is_ready() {
            return Err(InferenceError::NotReady {
                backend: BACKEND.into(),
            });
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            prompt: prompt.to_string(),
            reply: reply_tx,
        };

        // Queueing counts against the deadline: a hung generation must not
        // stall callers waiting for a free slot.
        let exchange = async {
            self.jobs.send(job).await.map_err(|_| InferenceError::Request {
                backend: BACKEND.into(),
                message: "inference worker has stopped".into(),
            })?;
            reply_rx.await.map_err(|_| InferenceError::Request {
                backend: BACKEND.into(),
                message: "inference worker dropped the request".into(),
            })?
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .unwrap_or_else(|_| {
                Err(InferenceError::Timeout {
                    backend: BACKEND.into(),
                    after: self.timeout,
                })
            })
    }
}
