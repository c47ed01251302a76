//! Encoding selector
//!
//! Every serialized message begins with a single prefix byte naming the
//! encoding of the body that follows:
//!
//! | Encoding | Prefix | Body |
//! |----------|--------|------|
//! | MessagePack | `b'M'` | `rmp_serde::to_vec` output |
//! | JSON | `b'J'` | `serde_json::to_vec` output |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire format targeted by a serialize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationType {
    /// Compact binary container format
    #[default]
    MsgPack,
    /// Textual structured format, for inspection and debugging
    Json,
}

impl SerializationType {
    /// All encodings, in prefix order.
    pub const ALL: [SerializationType; 2] = [SerializationType::MsgPack, SerializationType::Json];

    /// Prefix byte written in front of a message body.
    pub const fn prefix(self) -> u8 {
        match self {
            SerializationType::MsgPack => b'M',
            SerializationType::Json => b'J',
        }
    }

    /// Look up the encoding named by a prefix byte.
    pub fn from_prefix(byte: u8) -> Option<Self> {
        match byte {
            b'M' => Some(SerializationType::MsgPack),
            b'J' => Some(SerializationType::Json),
            _ => None,
        }
    }

    /// Lowercase name, as used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            SerializationType::MsgPack => "msgpack",
            SerializationType::Json => "json",
        }
    }
}

impl fmt::Display for SerializationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_roundtrip() {
        for encoding in SerializationType::ALL {
            assert_eq!(SerializationType::from_prefix(encoding.prefix()), Some(encoding));
        }
    }

    #[test]
    fn test_prefixes_are_distinct() {
        assert_ne!(
            SerializationType::MsgPack.prefix(),
            SerializationType::Json.prefix()
        );
    }

    #[test]
    fn test_unknown_prefix() {
        assert_eq!(SerializationType::from_prefix(b'X'), None);
        assert_eq!(SerializationType::from_prefix(0), None);
        // JSON bodies start with these; they must never be mistaken for a prefix
        assert_eq!(SerializationType::from_prefix(b'['), None);
        assert_eq!(SerializationType::from_prefix(b'{'), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SerializationType::MsgPack.to_string(), "msgpack");
        assert_eq!(SerializationType::Json.to_string(), "json");
    }

    #[test]
    fn test_default_is_msgpack() {
        assert_eq!(SerializationType::default(), SerializationType::MsgPack);
    }
}
