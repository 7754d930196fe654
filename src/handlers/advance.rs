use crate::error::RollupLlmError;
use crate::inference::InferenceAdapter;
use crate::rollup::codec;
use crate::rollup::notice::{NoticeEmitter, PublishOutcome};
use crate::rollup::types::{AdvanceMetadata, Verdict};
use serde_json::Value;
use std::sync::Arc;

/// Answers an advance request with one completion, published as a notice.
///
/// Accept is only returned once the notice has been published; every failure
/// on the way (payload validation, inference, publication) becomes Reject.
pub struct AdvanceHandler {
    inference: Arc<dyn InferenceAdapter>,
    notices: Arc<dyn NoticeEmitter>,
}

impl AdvanceHandler {
    pub fn new(inference: Arc<dyn InferenceAdapter>, notices: Arc<dyn NoticeEmitter>) -> Self {
        Self { inference, notices }
    }

    pub async fn handle(&self, data: &Value) -> Verdict {
        if let Some(metadata) = AdvanceMetadata::from_data(data) {
            tracing::info!(
                input_index = ?metadata.input_index,
                msg_sender = metadata.msg_sender.as_deref().unwrap_or("-"),
                "Received advance request"
            );
        } else {
            tracing::info!("Received advance request");
        }

        match self.process(data).await {
            Ok(()) => Verdict::Accept,
            Err(e) => {
                tracing::warn!("Rejecting advance request: {e}");
                Verdict::Reject
            }
        }
    }

    async fn process(&self, data: &Value) -> Result<(), RollupLlmError> {
        let prompt = codec::payload_text(data)?;
        tracing::debug!(prompt = %prompt, "Generating response for input");

        let completion = self.inference.generate(&prompt).await?;
        tracing::debug!(completion = %completion, "Generated response");

        match self.notices.publish(&codec::encode_text(&completion)).await {
            PublishOutcome::Published => Ok(()),
            PublishOutcome::Failed(reason) => Err(RollupLlmError::Notice(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{RecordingNotices, ScriptedInference};
    use serde_json::json;

    fn handler(
        inference: &Arc<ScriptedInference>,
        notices: &Arc<RecordingNotices>,
    ) -> AdvanceHandler {
        AdvanceHandler::new(
            Arc::clone(inference) as Arc<dyn InferenceAdapter>,
            Arc::clone(notices) as Arc<dyn NoticeEmitter>,
        )
    }

    #[tokio::test]
    async fn valid_payload_generates_and_publishes() {
        let inference = Arc::new(ScriptedInference::replying("hello"));
        let notices = Arc::new(RecordingNotices::accepting());

        let verdict = handler(&inference, &notices)
            .handle(&json!({"payload": codec::encode_text("hi")}))
            .await;

        assert_eq!(verdict, Verdict::Accept);
        assert_eq!(inference.prompts(), vec!["hi".to_string()]);
        assert_eq!(notices.payloads(), vec![codec::encode_text("hello")]);
    }

    #[tokio::test]
    async fn metadata_does_not_change_the_outcome() {
        let inference = Arc::new(ScriptedInference::replying("ok"));
        let notices = Arc::new(RecordingNotices::accepting());

        let verdict = handler(&inference, &notices)
            .handle(&json!({
                "metadata": {"msg_sender": "0xabc", "input_index": 7},
                "payload": codec::encode_text("ping")
            }))
            .await;

        assert_eq!(verdict, Verdict::Accept);
        assert_eq!(notices.payloads().len(), 1);
    }

    #[tokio::test]
    async fn non_text_payload_rejects_without_side_effects() {
        let inference = Arc::new(ScriptedInference::replying("unused"));
        let notices = Arc::new(RecordingNotices::accepting());

        let verdict = handler(&inference, &notices)
            .handle(&json!({"payload": 123}))
            .await;

        assert_eq!(verdict, Verdict::Reject);
        assert!(inference.prompts().is_empty());
        assert!(notices.payloads().is_empty());
    }

    #[tokio::test]
    async fn missing_payload_rejects_without_side_effects() {
        let inference = Arc::new(ScriptedInference::replying("unused"));
        let notices = Arc::new(RecordingNotices::accepting());

        let verdict = handler(&inference, &notices).handle(&json!({})).await;

        assert_eq!(verdict, Verdict::Reject);
        assert!(inference.prompts().is_empty());
        assert!(notices.payloads().is_empty());
    }

    #[tokio::test]
    async fn undecodable_payload_rejects_before_inference() {
        let inference = Arc::new(ScriptedInference::replying("unused"));
        let notices = Arc::new(RecordingNotices::accepting());
        let h = handler(&inference, &notices);

        assert_eq!(h.handle(&json!({"payload": "0xnothex"})).await, Verdict::Reject);
        assert_eq!(h.handle(&json!({"payload": "0xfffe"})).await, Verdict::Reject);
        assert!(inference.prompts().is_empty());
        assert!(notices.payloads().is_empty());
    }

    #[tokio::test]
    async fn inference_failure_rejects_without_notice() {
        let inference = Arc::new(ScriptedInference::failing());
        let notices = Arc::new(RecordingNotices::accepting());

        let verdict = handler(&inference, &notices)
            .handle(&json!({"payload": codec::encode_text("hi")}))
            .await;

        assert_eq!(verdict, Verdict::Reject);
        assert_eq!(inference.prompts().len(), 1);
        assert!(notices.payloads().is_empty());
    }

    #[tokio::test]
    async fn notice_failure_rejects() {
        let inference = Arc::new(ScriptedInference::replying("hello"));
        let notices = Arc::new(RecordingNotices::refusing());

        let verdict = handler(&inference, &notices)
            .handle(&json!({"payload": codec::encode_text("hi")}))
            .await;

        assert_eq!(verdict, Verdict::Reject);
        assert_eq!(notices.payloads().len(), 1);
    }
}
