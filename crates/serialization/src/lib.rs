//! Serialization dispatch for dataformats records
//!
//! This crate defines the generic entry points every record type plugs into:
//! - SerializationType: the encoding selector (MessagePack or JSON)
//! - serialize / deserialize: one-byte prefix + encoded body
//! - MessageCodec: the same dispatch with configured defaults and size limits
//! - SerializationError: the error taxonomy shared by both encodings
//! - hooks: how a reconstruction hook reports malformed elements
//!
//! Record types participate through serde's `Serialize` / `Deserialize`
//! traits. MessagePack (via `rmp-serde`) reports itself as a binary format and
//! JSON (via `serde_json`) as a human-readable one, which is what lets a single
//! impl pick the right wire shape for each encoding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod hooks;

pub use config::{SerializationConfig, DEFAULT_MAX_MESSAGE_BYTES};
pub use dispatch::{deserialize, serialize, MessageCodec};
pub use encoding::SerializationType;
pub use error::{SerializationError, SerializationResult};
pub use hooks::{malformed_element, MalformedElement, MALFORMED_ELEMENT};
