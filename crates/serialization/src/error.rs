//! Error types for serialization dispatch
//!
//! Codec errors are carried unchanged so callers can inspect them. The one
//! exception is a reconstruction hook rejecting an element of the input, which
//! is lifted out of the codec error into [`SerializationError::MalformedInput`].

use crate::encoding::SerializationType;
use thiserror::Error;

/// Result type alias for serialization operations
pub type SerializationResult<T> = std::result::Result<T, SerializationError>;

/// Errors from serialize/deserialize dispatch
#[derive(Debug, Error)]
pub enum SerializationError {
    /// MessagePack encoder failed
    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[source] rmp_serde::encode::Error),

    /// JSON encoder failed
    #[error("JSON encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),

    /// MessagePack decoder could not produce the expected shape
    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[source] rmp_serde::decode::Error),

    /// JSON decoder could not produce the expected shape
    #[error("JSON decode error: {0}")]
    JsonDecode(#[source] serde_json::Error),

    /// A reconstruction hook rejected an element of the decoded input
    #[error("Malformed {encoding} input: {detail}")]
    MalformedInput {
        /// Encoding of the rejected message
        encoding: SerializationType,
        /// Codec message describing the rejected element
        detail: String,
    },

    /// Message had no prefix byte
    #[error("Empty message")]
    EmptyMessage,

    /// Message prefix does not name a known encoding
    #[error("Unknown serialization prefix: {0:#04x}")]
    UnknownPrefix(u8),

    /// Message exceeds the configured size limit
    #[error("Message too large: {actual} bytes (max {max})")]
    MessageTooLarge {
        /// Message size including the prefix byte
        actual: usize,
        /// Configured limit
        max: usize,
    },

    /// Configuration could not be parsed or is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SerializationError {
    /// Whether this is the malformed-input condition.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, SerializationError::MalformedInput { .. })
    }

    /// Whether the codec itself failed to decode the message body.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            SerializationError::MsgPackDecode(_) | SerializationError::JsonDecode(_)
        )
    }
}
