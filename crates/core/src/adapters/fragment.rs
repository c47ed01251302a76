//! serde hooks for [`Fragment`]

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{deserialize_record, serialize_record, BufferBacked};
use crate::buffer::BufferAdoption;
use crate::error::RecordResult;
use crate::fragment::Fragment;

impl BufferBacked for Fragment {
    const KIND: &'static str = "Fragment";

    fn storage(&self) -> &[u8] {
        Fragment::storage(self)
    }

    fn total_size_bytes(&self) -> usize {
        Fragment::total_size_bytes(self)
    }

    fn from_buffer_with_size(adoption: BufferAdoption<'_>, size: usize) -> RecordResult<Self> {
        Fragment::from_buffer_with_size(adoption, size)
    }
}

impl Serialize for Fragment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_record(self, serializer)
    }
}

impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_record(deserializer)
    }
}
