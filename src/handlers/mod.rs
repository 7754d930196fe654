pub mod advance;
pub mod inspect;
#[cfg(test)]
pub(crate) mod test_support;

pub use advance::AdvanceHandler;
pub use inspect::InspectHandler;

use crate::error::DispatchError;
use crate::inference::InferenceAdapter;
use crate::rollup::notice::NoticeEmitter;
use crate::rollup::types::{PendingRequest, RequestType, Verdict};
use serde_json::Value;
use std::sync::Arc;

/// Routes a coordinator request to the handler for its type.
pub struct Dispatcher {
    advance: AdvanceHandler,
    inspect: InspectHandler,
}

impl Dispatcher {
    pub fn new(inference: Arc<dyn InferenceAdapter>, notices: Arc<dyn NoticeEmitter>) -> Self {
        Self {
            advance: AdvanceHandler::new(inference, notices),
            inspect: InspectHandler,
        }
    }

    /// Parse `body` and run its handler.
    ///
    /// An unknown type or unparseable body is returned as an error; the caller
    /// turns it into Reject.
    pub async fn dispatch(&self, body: Value) -> Result<Verdict, DispatchError> {
        let request = PendingRequest::from_json(body)?;
        Ok(self.route(&request).await)
    }

    pub async fn route(&self, request: &PendingRequest) -> Verdict {
        match request.request_type {
            RequestType::Advance => self.advance.handle(&request.data).await,
            RequestType::Inspect => self.inspect.handle(&request.data),
        }
    }
}
