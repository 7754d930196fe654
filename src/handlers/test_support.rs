//! Recording doubles for the inference and notice seams.

use crate::error::InferenceError;
use crate::inference::{InferenceAdapter, Readiness};
use crate::rollup::notice::{NoticeEmitter, PublishOutcome};
use async_trait::async_trait;
use std::sync::Mutex;

pub(crate) struct ScriptedInference {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInference {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceAdapter for ScriptedInference {
    fn name(&self) -> &str {
        "scripted"
    }

    fn readiness(&self) -> Readiness {
        Readiness::Ready
    }

    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or_else(|| InferenceError::Request {
            backend: "scripted".into(),
            message: "backend unreachable".into(),
        })
    }
}

pub(crate) struct RecordingNotices {
    accept: bool,
    payloads: Mutex<Vec<String>>,
}

impl RecordingNotices {
    pub(crate) fn accepting() -> Self {
        Self {
            accept: true,
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn refusing() -> Self {
        Self {
            accept: false,
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl NoticeEmitter for RecordingNotices {
    async fn publish(&self, payload: &str) -> PublishOutcome {
        self.payloads.lock().unwrap().push(payload.to_string());
        if self.accept {
            PublishOutcome::Published
        } else {
            PublishOutcome::Failed("coordinator answered 500".into())
        }
    }
}
