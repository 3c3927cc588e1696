//! Line codec.
//!
//! Each message is one compact JSON object terminated by a newline. Incoming
//! lines are decoded into `ClientMessage` here, at the edge, so malformed
//! input never reaches the session.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::message::ClientMessage;

/// Errors that can occur when decoding or encoding a protocol line.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("invalid JSON: {0}")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("message has no type")]
    MissingType,

    #[error("unknown command '{0}'")]
    UnknownType(String),

    #[error("malformed '{kind}' message: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Parses a single input line into a `ClientMessage`.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_message(line: &str) -> Result<Option<ClientMessage>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(ProtocolError::InvalidJson)?;
    let kind = match value.get("type").and_then(Value::as_str) {
        Some(k) => k.to_string(),
        None => return Err(ProtocolError::MissingType),
    };
    if !ClientMessage::TYPES.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownType(kind));
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| ProtocolError::Malformed { kind, source })
}

/// Decodes one raw input line (without its newline) into a `ClientMessage`.
///
/// Bytes that are not UTF-8 are reported like any other undecodable line.
pub fn decode_line(bytes: &[u8]) -> Result<Option<ClientMessage>, ProtocolError> {
    let line = std::str::from_utf8(bytes).map_err(ProtocolError::InvalidUtf8)?;
    parse_message(line)
}

/// Encodes a message as one compact JSON line, without the trailing newline.
pub fn encode_line<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(ProtocolError::Encode)
}
