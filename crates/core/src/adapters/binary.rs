//! Binary adapter pair
//!
//! Extraction writes the storage as a single byte blob (`bin8/16/32` in
//! MessagePack). Reconstruction accepts nothing but a blob and builds the
//! record by copy, using the blob length as the total size. The bytes are not
//! inspected beyond what the record constructor needs.

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

use super::{extent, BufferBacked};
use crate::buffer::BufferAdoption;

/// Write a record's storage as one length-prefixed blob.
pub fn extract<R, S>(record: &R, serializer: S) -> Result<S::Ok, S::Error>
where
    R: BufferBacked,
    S: Serializer,
{
    let storage = extent::<R, S::Error>(record)?;
    trace!(kind = R::KIND, bytes = storage.len(), "Extracting binary blob");
    serializer.serialize_bytes(storage)
}

/// Rebuild a record from a blob delivered by the decoder.
pub fn reconstruct<'de, R, D>(deserializer: D) -> Result<R, D::Error>
where
    R: BufferBacked,
    D: Deserializer<'de>,
{
    deserializer.deserialize_bytes(BlobVisitor::<R>(PhantomData))
}

struct BlobVisitor<R>(PhantomData<fn() -> R>);

impl<'de, R: BufferBacked> Visitor<'de> for BlobVisitor<R> {
    type Value = R;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a binary blob holding a {}", R::KIND)
    }

    fn visit_bytes<E>(self, bytes: &[u8]) -> Result<R, E>
    where
        E: de::Error,
    {
        trace!(kind = R::KIND, bytes = bytes.len(), "Reconstructing from binary blob");
        R::from_buffer_with_size(BufferAdoption::CopyFromBuffer(bytes), bytes.len()).map_err(|e| {
            debug!(kind = R::KIND, error = %e, "Binary reconstruction failed");
            E::custom(e)
        })
    }
}
