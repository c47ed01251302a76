//! serde hooks for [`TriggerRecordHeader`]

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{deserialize_record, serialize_record, BufferBacked};
use crate::buffer::BufferAdoption;
use crate::error::RecordResult;
use crate::trigger_record_header::TriggerRecordHeader;

impl BufferBacked for TriggerRecordHeader {
    const KIND: &'static str = "TriggerRecordHeader";

    fn storage(&self) -> &[u8] {
        TriggerRecordHeader::storage(self)
    }

    fn total_size_bytes(&self) -> usize {
        TriggerRecordHeader::total_size_bytes(self)
    }

    fn from_buffer_with_size(adoption: BufferAdoption<'_>, size: usize) -> RecordResult<Self> {
        TriggerRecordHeader::from_buffer_with_size(adoption, size)
    }
}

impl Serialize for TriggerRecordHeader {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_record(self, serializer)
    }
}

impl<'de> Deserialize<'de> for TriggerRecordHeader {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_record(deserializer)
    }
}
