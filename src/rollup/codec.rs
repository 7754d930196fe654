//! Hex payload codec used on the coordinator wire.
//!
//! Payloads travel as `0x`-prefixed lowercase hex. Decoding accepts the
//! prefix as optional and either case.

use crate::error::ValidationError;
use serde_json::Value;

pub fn encode_bytes(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn encode_text(text: &str) -> String {
    encode_bytes(text.as_bytes())
}

pub fn decode_bytes(encoded: &str) -> Result<Vec<u8>, ValidationError> {
    let digits = encoded
        .strip_prefix("0x")
        .or_else(|| encoded.strip_prefix("0X"))
        .unwrap_or(encoded);
    hex::decode(digits).map_err(|e| ValidationError::InvalidHex(e.to_string()))
}

pub fn decode_text(encoded: &str) -> Result<String, ValidationError> {
    let bytes = decode_bytes(encoded)?;
    String::from_utf8(bytes).map_err(|e| ValidationError::InvalidUtf8(e.to_string()))
}

/// Pull `data.payload` out of a request and decode it to text.
pub fn payload_text(data: &Value) -> Result<String, ValidationError> {
    match data.get("payload") {
        None | Some(Value::Null) => Err(ValidationError::MissingPayload),
        Some(Value::String(encoded)) => decode_text(encoded),
        Some(other) => Err(ValidationError::PayloadNotText(json_type_name(other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
