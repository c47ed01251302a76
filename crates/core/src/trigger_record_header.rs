//! TriggerRecordHeader: which components a trigger asked for
//!
//! One buffer holds a fixed 48-byte header followed by
//! `num_requested_components` component requests of 24 bytes each. The total
//! size is derived from the component count, so the buffer is self-describing.
//!
//! # Layout (little-endian)
//!
//! ```text
//! marker(4) + version(4) + trigger_number(8) + trigger_timestamp(8)
//! + num_requested_components(8) + run_number(4) + error_bits(4)
//! + trigger_type(2) + reserved(6) = 48 bytes
//!
//! per component: apa_number(4) + link_number(4) + window_begin(8) + window_end(8) = 24 bytes
//! ```

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::buffer::{allocate_zeroed, size_to_usize, BufferAdoption};
use crate::error::{RecordError, RecordResult};
use crate::geo_id::GeoId;

/// Marker word at the start of every trigger record header.
pub const TRIGGER_RECORD_HEADER_MARKER: u32 = 0x3333_4444;

/// Current trigger record header version.
pub const TRIGGER_RECORD_HEADER_VERSION: u32 = 1;

/// Size of the fixed header in bytes.
pub const TRIGGER_RECORD_HEADER_SIZE: usize = 48;

/// Size of one encoded [`ComponentRequest`] in bytes.
pub const COMPONENT_REQUEST_SIZE: usize = 24;

const MARKER_OFFSET: usize = 0;
const VERSION_OFFSET: usize = 4;
const TRIGGER_NUMBER_OFFSET: usize = 8;
const TRIGGER_TIMESTAMP_OFFSET: usize = 16;
const NUM_COMPONENTS_OFFSET: usize = 24;
const RUN_NUMBER_OFFSET: usize = 32;
const ERROR_BITS_OFFSET: usize = 36;
const TRIGGER_TYPE_OFFSET: usize = 40;

/// Error conditions a trigger record can flag in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerRecordErrorBit {
    /// Fragments received do not match the components requested
    Mismatch,
    /// Reserved for future use
    Unassigned1,
    /// Reserved for future use
    Unassigned2,
    /// Reserved for future use
    Unassigned3,
}

impl TriggerRecordErrorBit {
    /// Bit position within `error_bits`.
    pub const fn index(self) -> u32 {
        match self {
            TriggerRecordErrorBit::Mismatch => 0,
            TriggerRecordErrorBit::Unassigned1 => 1,
            TriggerRecordErrorBit::Unassigned2 => 2,
            TriggerRecordErrorBit::Unassigned3 => 3,
        }
    }
}

/// A request for one link's data over a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentRequest {
    /// Link the data is requested from
    pub component: GeoId,
    /// First timestamp of the requested window
    pub window_begin: u64,
    /// Last timestamp of the requested window
    pub window_end: u64,
}

impl ComponentRequest {
    /// Create a request for `component` over `[window_begin, window_end]`.
    pub fn new(component: GeoId, window_begin: u64, window_end: u64) -> Self {
        Self {
            component,
            window_begin,
            window_end,
        }
    }

    fn write_to(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..], self.component.apa_number);
        LittleEndian::write_u32(&mut buf[4..], self.component.link_number);
        LittleEndian::write_u64(&mut buf[8..], self.window_begin);
        LittleEndian::write_u64(&mut buf[16..], self.window_end);
    }

    fn read_from(buf: &[u8]) -> Self {
        ComponentRequest {
            component: GeoId {
                apa_number: LittleEndian::read_u32(&buf[0..]),
                link_number: LittleEndian::read_u32(&buf[4..]),
            },
            window_begin: LittleEndian::read_u64(&buf[8..]),
            window_end: LittleEndian::read_u64(&buf[16..]),
        }
    }
}

/// Trigger record header and component list in one owned buffer.
///
/// Invariant: `storage.len() >= TRIGGER_RECORD_HEADER_SIZE`.
#[derive(Clone, PartialEq, Eq)]
pub struct TriggerRecordHeader {
    storage: Vec<u8>,
}

impl TriggerRecordHeader {
    /// Allocate a header listing the given component requests.
    ///
    /// Numeric fields other than the component count start at zero.
    pub fn new(components: &[ComponentRequest]) -> RecordResult<Self> {
        let total = total_size_for(components.len() as u64)?;
        let mut storage = allocate_zeroed(total)?;

        LittleEndian::write_u32(&mut storage[MARKER_OFFSET..], TRIGGER_RECORD_HEADER_MARKER);
        LittleEndian::write_u32(&mut storage[VERSION_OFFSET..], TRIGGER_RECORD_HEADER_VERSION);
        LittleEndian::write_u64(&mut storage[NUM_COMPONENTS_OFFSET..], components.len() as u64);

        let body = storage[TRIGGER_RECORD_HEADER_SIZE..].chunks_exact_mut(COMPONENT_REQUEST_SIZE);
        for (slot, component) in body.zip(components) {
            component.write_to(slot);
        }
        Ok(TriggerRecordHeader { storage })
    }

    /// Build a header whose length comes from its component count.
    ///
    /// Bytes past the last component are not part of the record.
    pub fn from_buffer(adoption: BufferAdoption<'_>) -> RecordResult<Self> {
        let bytes = adoption.as_slice();
        if bytes.len() < TRIGGER_RECORD_HEADER_SIZE {
            return Err(RecordError::BufferTooShort {
                required: TRIGGER_RECORD_HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let count = LittleEndian::read_u64(&bytes[NUM_COMPONENTS_OFFSET..]);
        let total = total_size_for(count)?;
        Ok(TriggerRecordHeader {
            storage: adoption.into_storage(total)?,
        })
    }

    /// Build a header of externally known total size.
    ///
    /// The component count is not consulted; [`at`](Self::at) still refuses
    /// indices whose entries would lie past the end of storage.
    pub fn from_buffer_with_size(adoption: BufferAdoption<'_>, size: usize) -> RecordResult<Self> {
        if size < TRIGGER_RECORD_HEADER_SIZE {
            return Err(RecordError::InvalidSize {
                declared: size as u64,
                minimum: TRIGGER_RECORD_HEADER_SIZE,
            });
        }
        Ok(TriggerRecordHeader {
            storage: adoption.into_storage(size)?,
        })
    }

    /// Marker word as stored.
    pub fn header_marker(&self) -> u32 {
        LittleEndian::read_u32(&self.storage[MARKER_OFFSET..])
    }

    /// Header version as stored.
    pub fn version(&self) -> u32 {
        LittleEndian::read_u32(&self.storage[VERSION_OFFSET..])
    }

    /// Trigger number.
    pub fn trigger_number(&self) -> u64 {
        LittleEndian::read_u64(&self.storage[TRIGGER_NUMBER_OFFSET..])
    }

    /// Set the trigger number.
    pub fn set_trigger_number(&mut self, value: u64) {
        LittleEndian::write_u64(&mut self.storage[TRIGGER_NUMBER_OFFSET..], value);
    }

    /// Trigger timestamp.
    pub fn trigger_timestamp(&self) -> u64 {
        LittleEndian::read_u64(&self.storage[TRIGGER_TIMESTAMP_OFFSET..])
    }

    /// Set the trigger timestamp.
    pub fn set_trigger_timestamp(&mut self, value: u64) {
        LittleEndian::write_u64(&mut self.storage[TRIGGER_TIMESTAMP_OFFSET..], value);
    }

    /// Number of component requests declared in the header.
    pub fn num_requested_components(&self) -> u64 {
        LittleEndian::read_u64(&self.storage[NUM_COMPONENTS_OFFSET..])
    }

    /// Run number.
    pub fn run_number(&self) -> u32 {
        LittleEndian::read_u32(&self.storage[RUN_NUMBER_OFFSET..])
    }

    /// Set the run number.
    pub fn set_run_number(&mut self, value: u32) {
        LittleEndian::write_u32(&mut self.storage[RUN_NUMBER_OFFSET..], value);
    }

    /// Raw error bit set.
    pub fn error_bits(&self) -> u32 {
        LittleEndian::read_u32(&self.storage[ERROR_BITS_OFFSET..])
    }

    /// Replace the whole error bit set.
    pub fn set_error_bits(&mut self, bits: u32) {
        LittleEndian::write_u32(&mut self.storage[ERROR_BITS_OFFSET..], bits);
    }

    /// Whether an error bit is set.
    pub fn error_bit(&self, bit: TriggerRecordErrorBit) -> bool {
        self.error_bits() & (1 << bit.index()) != 0
    }

    /// Set or clear one error bit.
    pub fn set_error_bit(&mut self, bit: TriggerRecordErrorBit, value: bool) {
        let mask = 1u32 << bit.index();
        let bits = if value {
            self.error_bits() | mask
        } else {
            self.error_bits() & !mask
        };
        self.set_error_bits(bits);
    }

    /// Trigger type code.
    pub fn trigger_type(&self) -> u16 {
        LittleEndian::read_u16(&self.storage[TRIGGER_TYPE_OFFSET..])
    }

    /// Set the trigger type code.
    pub fn set_trigger_type(&mut self, value: u16) {
        LittleEndian::write_u16(&mut self.storage[TRIGGER_TYPE_OFFSET..], value);
    }

    /// Number of bytes of storage this header owns.
    pub fn total_size_bytes(&self) -> usize {
        self.storage.len()
    }

    /// Component request at `index`.
    pub fn at(&self, index: usize) -> RecordResult<ComponentRequest> {
        let count = self.num_requested_components();
        let out_of_range = RecordError::ComponentOutOfRange { index, count };
        if index as u64 >= count {
            return Err(out_of_range);
        }
        let start = index
            .checked_mul(COMPONENT_REQUEST_SIZE)
            .and_then(|offset| offset.checked_add(TRIGGER_RECORD_HEADER_SIZE))
            .ok_or(RecordError::SizeOverflow)?;
        let slot = self
            .storage
            .get(start..)
            .and_then(|rest| rest.get(..COMPONENT_REQUEST_SIZE));
        match slot {
            Some(slot) => Ok(ComponentRequest::read_from(slot)),
            None => Err(out_of_range),
        }
    }

    /// Component requests actually present in storage, in order.
    pub fn components(&self) -> impl Iterator<Item = ComponentRequest> + '_ {
        let count = usize::try_from(self.num_requested_components()).unwrap_or(usize::MAX);
        self.storage[TRIGGER_RECORD_HEADER_SIZE..]
            .chunks_exact(COMPONENT_REQUEST_SIZE)
            .take(count)
            .map(ComponentRequest::read_from)
    }

    /// The whole buffer, header first.
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Give up the buffer.
    pub fn into_storage(self) -> Vec<u8> {
        self.storage
    }
}

impl fmt::Debug for TriggerRecordHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerRecordHeader")
            .field("trigger_number", &self.trigger_number())
            .field("run_number", &self.run_number())
            .field("num_requested_components", &self.num_requested_components())
            .field("total_size_bytes", &self.total_size_bytes())
            .finish()
    }
}

fn total_size_for(count: u64) -> RecordResult<usize> {
    let count = size_to_usize(count)?;
    count
        .checked_mul(COMPONENT_REQUEST_SIZE)
        .and_then(|body| body.checked_add(TRIGGER_RECORD_HEADER_SIZE))
        .ok_or(RecordError::SizeOverflow)
}
