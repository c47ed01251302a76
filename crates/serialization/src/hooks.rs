//! Reconstruction-hook contract
//!
//! Record types reconstruct themselves inside serde `Deserialize` impls, so the
//! only channel back to dispatch is the codec's own error type. A hook that
//! rejects an element raises [`MalformedElement`] through
//! `serde::de::Error::custom`; the rendered message starts with
//! [`MALFORMED_ELEMENT`], and dispatch lifts any codec error carrying that
//! marker into [`SerializationError::MalformedInput`].
//!
//! Classification is by message text. A custom error from some other
//! `Deserialize` impl whose message happens to start with the marker is
//! reported as malformed input too; build hook errors with
//! [`malformed_element`] and nothing else should produce that prefix.
//!
//! [`SerializationError::MalformedInput`]: crate::SerializationError::MalformedInput

use serde::de::{self, Unexpected};
use std::fmt;

/// Leading text of every malformed-element message.
pub const MALFORMED_ELEMENT: &str = "malformed element at index";

/// A textual byte list held something other than an integral byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedElement {
    /// Zero-based position of the offending element
    pub index: usize,
    /// Description of what was found instead
    pub found: String,
}

impl fmt::Display for MalformedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: expected an integral byte value, found {}",
            MALFORMED_ELEMENT, self.index, self.found
        )
    }
}

/// Build the codec error a reconstruction hook returns for a rejected element.
pub fn malformed_element<E: de::Error>(index: usize, found: Unexpected<'_>) -> E {
    E::custom(MalformedElement {
        index,
        found: found.to_string(),
    })
}

/// Whether a codec error message was produced by [`malformed_element`].
pub(crate) fn is_malformed_message(message: &str) -> bool {
    message.starts_with(MALFORMED_ELEMENT)
}
