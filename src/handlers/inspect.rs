use crate::rollup::codec;
use crate::rollup::types::Verdict;
use serde_json::Value;

/// Read-only path. Never touches inference or notices.
#[derive(Debug, Default, Clone, Copy)]
pub struct InspectHandler;

impl InspectHandler {
    pub fn handle(self, data: &Value) -> Verdict {
        match codec::payload_text(data) {
            Ok(query) => tracing::info!(query = %query, "Received inspect request"),
            Err(_) => tracing::info!("Received inspect request"),
        }
        Verdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn always_accepts() {
        let handler = InspectHandler;
        assert_eq!(handler.handle(&json!({})), Verdict::Accept);
        assert_eq!(
            handler.handle(&json!({"payload": codec::encode_text("balance")})),
            Verdict::Accept
        );
        assert_eq!(handler.handle(&json!({"payload": 42})), Verdict::Accept);
        assert_eq!(handler.handle(&Value::Null), Verdict::Accept);
    }
}
