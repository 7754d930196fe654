use crate::error::DispatchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum::{Display, EnumString};

/// Outcome of processing one request, reported on the next `/finish`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Verdict {
    #[default]
    Accept,
    Reject,
}

impl Verdict {
    pub fn is_accept(self) -> bool {
        matches!(self, Self::Accept)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum RequestType {
    #[strum(serialize = "advance_state")]
    Advance,
    #[strum(serialize = "inspect_state")]
    Inspect,
}

/// Body of `POST /finish`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FinishRequest {
    pub status: Verdict,
}

/// Body of `POST /notice`.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeRequest<'a> {
    pub payload: &'a str,
}

/// Request body as the coordinator sends it, before the type is checked.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRollupRequest {
    pub request_type: String,
    #[serde(default)]
    pub data: Value,
}

/// A request whose type is known. `data` stays untyped until the handler
/// validates it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub request_type: RequestType,
    pub data: Value,
}

impl TryFrom<RawRollupRequest> for PendingRequest {
    type Error = DispatchError;

    fn try_from(raw: RawRollupRequest) -> Result<Self, Self::Error> {
        let request_type = RequestType::from_str(&raw.request_type)
            .map_err(|_| DispatchError::UnknownRequestType(raw.request_type.clone()))?;
        Ok(Self {
            request_type,
            data: raw.data,
        })
    }
}

impl PendingRequest {
    pub fn from_json(body: Value) -> Result<Self, DispatchError> {
        let raw: RawRollupRequest = serde_json::from_value(body)
            .map_err(|e| DispatchError::MalformedRequest(e.to_string()))?;
        Self::try_from(raw)
    }
}

/// Input metadata attached to advance requests. Every field is optional so
/// coordinator versions with extra or missing fields still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdvanceMetadata {
    #[serde(default)]
    pub msg_sender: Option<String>,
    #[serde(default)]
    pub epoch_index: Option<u64>,
    #[serde(default)]
    pub input_index: Option<u64>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<u64>,
}

impl AdvanceMetadata {
    pub fn from_data(data: &Value) -> Option<Self> {
        data.get("metadata")
            .and_then(|m| serde_json::from_value(m.clone()).ok())
    }
}
