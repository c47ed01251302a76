//! Textual adapter pair
//!
//! Extraction writes the storage as a sequence of `u8`, one element per byte
//! in storage order. Reconstruction reads such a sequence element by element,
//! rejecting anything that is not an integer as a
//! [`MalformedElement`](dataformats_serialization::MalformedElement), then
//! builds the record by copy over the accumulated bytes.
//!
//! Integers are truncated to their low 8 bits, so `256` reads as `0` and `-1`
//! as `255`. Non-integral elements (`1.0`, `"7"`, `null`) are rejected.

use dataformats_serialization::malformed_element;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::Serializer;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

use super::{extent, BufferBacked};
use crate::buffer::BufferAdoption;

/// Upper bound on capacity reserved from a decoder's length hint.
const MAX_PREALLOCATED_BYTES: usize = 1024 * 1024;

/// Write a record's storage as a sequence of byte values.
pub fn extract<R, S>(record: &R, serializer: S) -> Result<S::Ok, S::Error>
where
    R: BufferBacked,
    S: Serializer,
{
    let storage = extent::<R, S::Error>(record)?;
    trace!(kind = R::KIND, bytes = storage.len(), "Extracting byte list");
    serializer.collect_seq(storage)
}

/// Rebuild a record from a sequence of byte values.
pub fn reconstruct<'de, R, D>(deserializer: D) -> Result<R, D::Error>
where
    R: BufferBacked,
    D: Deserializer<'de>,
{
    deserializer.deserialize_seq(ByteListVisitor::<R>(PhantomData))
}

struct ByteListVisitor<R>(PhantomData<fn() -> R>);

impl<'de, R: BufferBacked> Visitor<'de> for ByteListVisitor<R> {
    type Value = R;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a list of byte values holding a {}", R::KIND)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<R, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let hint = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATED_BYTES);
        let mut bytes = Vec::with_capacity(hint);
        while let Some(byte) = seq.next_element_seed(ByteElement { index: bytes.len() })? {
            bytes.push(byte);
        }

        trace!(kind = R::KIND, bytes = bytes.len(), "Reconstructing from byte list");
        R::from_buffer_with_size(BufferAdoption::CopyFromBuffer(&bytes), bytes.len()).map_err(|e| {
            debug!(kind = R::KIND, error = %e, "Textual reconstruction failed");
            de::Error::custom(e)
        })
    }
}

/// One element of a byte list, validated against its position.
#[derive(Debug, Clone, Copy)]
pub struct ByteElement {
    /// Position of the element in the list
    pub index: usize,
}

impl<'de> DeserializeSeed<'de> for ByteElement {
    type Value = u8;

    fn deserialize<D>(self, deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ByteElement {
    type Value = u8;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integral byte value")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u8, E> {
        Ok(v as u8)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u8, E> {
        Ok(v as u8)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u8, E> {
        Err(malformed_element(self.index, Unexpected::Float(v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<u8, E> {
        Err(malformed_element(self.index, Unexpected::Bool(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u8, E> {
        Err(malformed_element(self.index, Unexpected::Str(v)))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<u8, E> {
        Err(malformed_element(self.index, Unexpected::Bytes(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<u8, E> {
        Err(malformed_element(self.index, Unexpected::Unit))
    }

    fn visit_none<E: de::Error>(self) -> Result<u8, E> {
        Err(malformed_element(self.index, Unexpected::Option))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<u8, A::Error> {
        Err(malformed_element(self.index, Unexpected::Seq))
    }

    fn visit_map<A: MapAccess<'de>>(self, _map: A) -> Result<u8, A::Error> {
        Err(malformed_element(self.index, Unexpected::Map))
    }
}
