//! Serialization configuration via TOML
//!
//! Every field has a default, so an empty document is a valid configuration.

use crate::encoding::SerializationType;
use crate::error::{SerializationError, SerializationResult};
use serde::{Deserialize, Serialize};

/// Default upper bound on a serialized message, prefix byte included (64MB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Configuration for [`MessageCodec`](crate::MessageCodec).
///
/// # Example
///
/// ```toml
/// # Encoding used when none is given explicitly: "msgpack" or "json"
/// encoding = "msgpack"
///
/// # Largest message accepted or produced, in bytes
/// max_message_bytes = 67108864
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerializationConfig {
    /// Default encoding for `MessageCodec::encode`.
    #[serde(default)]
    pub encoding: SerializationType,
    /// Largest message accepted or produced, prefix byte included.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            encoding: SerializationType::default(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl SerializationConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the text is not valid TOML, names an unknown
    /// field or encoding, or sets `max_message_bytes` to zero.
    pub fn from_toml_str(text: &str) -> SerializationResult<Self> {
        let config: SerializationConfig =
            toml::from_str(text).map_err(|e| SerializationError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field ranges.
    pub fn validate(&self) -> SerializationResult<()> {
        if self.max_message_bytes == 0 {
            return Err(SerializationError::InvalidConfig(
                "max_message_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Dataformats serialization configuration
#
# Encoding used when none is given explicitly: "msgpack" (default) or "json"
#   "msgpack" = compact binary, the performance path
#   "json"    = one decimal number per byte, for inspection and debugging
encoding = "msgpack"

# Largest message accepted or produced, in bytes, prefix included (default: 64MB)
max_message_bytes = 67108864
"#
    }
}
