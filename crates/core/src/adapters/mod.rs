//! serde adapters for buffer-backed records
//!
//! Records cannot be default-constructed and then populated, so each one
//! plugs into serde with a hand-written `Serialize` (extraction hook) and a
//! `Deserialize` that builds the record in one step from the fully decoded
//! bytes (reconstruction hook).
//!
//! The wire shape depends on the format:
//!
//! | Format | `is_human_readable` | Shape |
//! |--------|---------------------|-------|
//! | MessagePack | false | one `bin` blob: length prefix + raw storage |
//! | JSON | true | array of integers 0-255, one per storage byte |
//!
//! Both shapes carry the storage byte for byte, header included, so a round
//! trip through either reproduces the record exactly. Reconstruction always
//! copies out of the decoder's buffer, which does not outlive the decode call.
//!
//! `Box<Fragment>` and `Box<TriggerRecordHeader>` need nothing extra: serde's
//! `Box<T>` impls serialize through the box and reconstruct straight into a
//! new one.

pub mod binary;
pub mod textual;

mod fragment;
mod trigger_record_header;

use serde::{Deserializer, Serializer};

use crate::buffer::BufferAdoption;
use crate::error::RecordResult;

/// A record whose whole state is one contiguous owned buffer.
pub trait BufferBacked: Sized {
    /// Record type name, used in decoder messages and logs.
    const KIND: &'static str;

    /// The record's storage, header first.
    fn storage(&self) -> &[u8];

    /// Number of storage bytes the extractors write.
    fn total_size_bytes(&self) -> usize;

    /// Build a record over a buffer of known total size.
    fn from_buffer_with_size(adoption: BufferAdoption<'_>, size: usize) -> RecordResult<Self>;
}

/// The first `total_size_bytes()` bytes of a record's storage.
fn extent<R, E>(record: &R) -> Result<&[u8], E>
where
    R: BufferBacked,
    E: serde::ser::Error,
{
    let len = record.total_size_bytes();
    record.storage().get(..len).ok_or_else(|| {
        E::custom(format!(
            "{} reports {} bytes but owns {}",
            R::KIND,
            len,
            record.storage().len()
        ))
    })
}

/// Extraction hook: pick the wire shape for the target format.
pub fn serialize_record<R, S>(record: &R, serializer: S) -> Result<S::Ok, S::Error>
where
    R: BufferBacked,
    S: Serializer,
{
    if serializer.is_human_readable() {
        textual::extract(record, serializer)
    } else {
        binary::extract(record, serializer)
    }
}

/// Reconstruction hook: decode the wire shape for the source format.
pub fn deserialize_record<'de, R, D>(deserializer: D) -> Result<R, D::Error>
where
    R: BufferBacked,
    D: Deserializer<'de>,
{
    if deserializer.is_human_readable() {
        textual::reconstruct(deserializer)
    } else {
        binary::reconstruct(deserializer)
    }
}
