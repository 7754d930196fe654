use crate::error::ValidationError;
use crate::rollup::codec;
use serde::{Deserialize, Serialize};

/// Body of `POST /gio`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GioRequest {
    pub domain: u16,
    pub id: String,
}

impl GioRequest {
    /// Wrap raw bytes as a GIO request for `domain`.
    pub fn for_body(domain: u16, body: &[u8]) -> Self {
        Self {
            domain,
            id: codec::encode_bytes(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GioResponse {
    pub response_code: u16,
    pub response: String,
}

impl GioResponse {
    pub fn decoded_text(&self) -> Result<String, ValidationError> {
        codec::decode_text(&self.response)
    }
}
