//! Fragment: the data one readout link contributes to a trigger record
//!
//! A fragment is a single contiguous buffer: a fixed 72-byte header followed
//! by an opaque payload. The header's `size` field holds the total length,
//! header included, which is what makes the buffer self-describing.
//!
//! # Header Layout (little-endian, 72 bytes)
//!
//! ```text
//! marker(4) + version(4) + size(8) + trigger_number(8) + trigger_timestamp(8)
//! + window_begin(8) + window_end(8) + run_number(4) + link_id(8)
//! + error_bits(4) + fragment_type(4) + reserved(4) = 72 bytes
//! ```

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

use crate::buffer::{size_to_usize, BufferAdoption};
use crate::error::{RecordError, RecordResult};
use crate::geo_id::GeoId;

/// Marker word at the start of every fragment header.
pub const FRAGMENT_HEADER_MARKER: u32 = 0x1111_2222;

/// Current fragment header version.
pub const FRAGMENT_HEADER_VERSION: u32 = 1;

/// Size of the fixed fragment header in bytes.
pub const FRAGMENT_HEADER_SIZE: usize = 72;

/// Sentinel for unset 64-bit header fields.
pub const INVALID_U64: u64 = u64::MAX;

/// Sentinel for unset 32-bit header fields.
pub const INVALID_U32: u32 = u32::MAX;

const MARKER_OFFSET: usize = 0;
const VERSION_OFFSET: usize = 4;
const SIZE_OFFSET: usize = 8;
const TRIGGER_NUMBER_OFFSET: usize = 16;
const TRIGGER_TIMESTAMP_OFFSET: usize = 24;
const WINDOW_BEGIN_OFFSET: usize = 32;
const WINDOW_END_OFFSET: usize = 40;
const RUN_NUMBER_OFFSET: usize = 48;
const APA_NUMBER_OFFSET: usize = 52;
const LINK_NUMBER_OFFSET: usize = 56;
const ERROR_BITS_OFFSET: usize = 60;
const FRAGMENT_TYPE_OFFSET: usize = 64;

/// Error conditions a fragment can flag in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentErrorBit {
    /// Requested data was not found in the readout buffer
    DataNotFound,
    /// Only part of the requested window was available
    Incomplete,
    /// Requested window was malformed
    InvalidWindow,
    /// Reserved for future use
    Unassigned3,
}

impl FragmentErrorBit {
    /// Bit position within `error_bits`.
    pub const fn index(self) -> u32 {
        match self {
            FragmentErrorBit::DataNotFound => 0,
            FragmentErrorBit::Incomplete => 1,
            FragmentErrorBit::InvalidWindow => 2,
            FragmentErrorBit::Unassigned3 => 3,
        }
    }
}

/// Decoded copy of a fragment header.
///
/// Used to build new fragments; the record itself never stores one, it reads
/// fields straight out of its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentHeader {
    /// Total fragment size, header included
    pub size: u64,
    /// Trigger this fragment answers
    pub trigger_number: u64,
    /// Timestamp of that trigger
    pub trigger_timestamp: u64,
    /// First timestamp of the readout window
    pub window_begin: u64,
    /// Last timestamp of the readout window
    pub window_end: u64,
    /// Run the trigger belongs to
    pub run_number: u32,
    /// Link the data was read from
    pub link_id: GeoId,
    /// Bit set of [`FragmentErrorBit`]s
    pub error_bits: u32,
    /// Detector-specific payload type code
    pub fragment_type: u32,
}

impl Default for FragmentHeader {
    fn default() -> Self {
        FragmentHeader {
            size: FRAGMENT_HEADER_SIZE as u64,
            trigger_number: INVALID_U64,
            trigger_timestamp: INVALID_U64,
            window_begin: INVALID_U64,
            window_end: INVALID_U64,
            run_number: INVALID_U32,
            link_id: GeoId::default(),
            error_bits: 0,
            fragment_type: INVALID_U32,
        }
    }
}

impl FragmentHeader {
    /// Encode to the fixed header layout, marker and version included.
    pub fn to_bytes(&self) -> [u8; FRAGMENT_HEADER_SIZE] {
        let mut buf = [0u8; FRAGMENT_HEADER_SIZE];
        LittleEndian::write_u32(&mut buf[MARKER_OFFSET..], FRAGMENT_HEADER_MARKER);
        LittleEndian::write_u32(&mut buf[VERSION_OFFSET..], FRAGMENT_HEADER_VERSION);
        LittleEndian::write_u64(&mut buf[SIZE_OFFSET..], self.size);
        LittleEndian::write_u64(&mut buf[TRIGGER_NUMBER_OFFSET..], self.trigger_number);
        LittleEndian::write_u64(&mut buf[TRIGGER_TIMESTAMP_OFFSET..], self.trigger_timestamp);
        LittleEndian::write_u64(&mut buf[WINDOW_BEGIN_OFFSET..], self.window_begin);
        LittleEndian::write_u64(&mut buf[WINDOW_END_OFFSET..], self.window_end);
        LittleEndian::write_u32(&mut buf[RUN_NUMBER_OFFSET..], self.run_number);
        LittleEndian::write_u32(&mut buf[APA_NUMBER_OFFSET..], self.link_id.apa_number);
        LittleEndian::write_u32(&mut buf[LINK_NUMBER_OFFSET..], self.link_id.link_number);
        LittleEndian::write_u32(&mut buf[ERROR_BITS_OFFSET..], self.error_bits);
        LittleEndian::write_u32(&mut buf[FRAGMENT_TYPE_OFFSET..], self.fragment_type);
        buf
    }

    /// Decode from the start of a buffer. Marker and version are not checked.
    pub fn from_bytes(bytes: &[u8]) -> RecordResult<Self> {
        if bytes.len() < FRAGMENT_HEADER_SIZE {
            return Err(RecordError::BufferTooShort {
                required: FRAGMENT_HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self::read(bytes))
    }

    fn read(bytes: &[u8]) -> Self {
        FragmentHeader {
            size: LittleEndian::read_u64(&bytes[SIZE_OFFSET..]),
            trigger_number: LittleEndian::read_u64(&bytes[TRIGGER_NUMBER_OFFSET..]),
            trigger_timestamp: LittleEndian::read_u64(&bytes[TRIGGER_TIMESTAMP_OFFSET..]),
            window_begin: LittleEndian::read_u64(&bytes[WINDOW_BEGIN_OFFSET..]),
            window_end: LittleEndian::read_u64(&bytes[WINDOW_END_OFFSET..]),
            run_number: LittleEndian::read_u32(&bytes[RUN_NUMBER_OFFSET..]),
            link_id: GeoId {
                apa_number: LittleEndian::read_u32(&bytes[APA_NUMBER_OFFSET..]),
                link_number: LittleEndian::read_u32(&bytes[LINK_NUMBER_OFFSET..]),
            },
            error_bits: LittleEndian::read_u32(&bytes[ERROR_BITS_OFFSET..]),
            fragment_type: LittleEndian::read_u32(&bytes[FRAGMENT_TYPE_OFFSET..]),
        }
    }
}

/// Header plus payload in one owned buffer.
///
/// Invariant: `storage.len() >= FRAGMENT_HEADER_SIZE`, so every accessor can
/// read the header without bounds failures.
#[derive(Clone, PartialEq, Eq)]
pub struct Fragment {
    storage: Vec<u8>,
}

impl Fragment {
    /// Build a fragment whose length comes from the header's `size` field.
    ///
    /// Bytes past `size` are not part of the fragment: copy mode ignores them
    /// and take-over mode truncates the vector.
    pub fn from_buffer(adoption: BufferAdoption<'_>) -> RecordResult<Self> {
        let size = declared_size(adoption.as_slice())?;
        Ok(Fragment {
            storage: adoption.into_storage(size)?,
        })
    }

    /// Build a fragment of externally known total size.
    ///
    /// The header's own `size` field is not consulted.
    pub fn from_buffer_with_size(adoption: BufferAdoption<'_>, size: usize) -> RecordResult<Self> {
        if size < FRAGMENT_HEADER_SIZE {
            return Err(RecordError::InvalidSize {
                declared: size as u64,
                minimum: FRAGMENT_HEADER_SIZE,
            });
        }
        Ok(Fragment {
            storage: adoption.into_storage(size)?,
        })
    }

    /// Allocate a new fragment from a header and payload pieces.
    ///
    /// The header's `size` is overwritten with the resulting total; the
    /// pieces are concatenated in order.
    pub fn from_pieces(header: &FragmentHeader, pieces: &[&[u8]]) -> RecordResult<Self> {
        let payload = pieces
            .iter()
            .try_fold(0usize, |acc, piece| acc.checked_add(piece.len()))
            .ok_or(RecordError::SizeOverflow)?;
        let total = FRAGMENT_HEADER_SIZE
            .checked_add(payload)
            .ok_or(RecordError::SizeOverflow)?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(total)
            .map_err(|_| RecordError::Allocation { requested: total })?;

        let header = FragmentHeader {
            size: total as u64,
            ..header.clone()
        };
        storage.extend_from_slice(&header.to_bytes());
        for piece in pieces {
            storage.extend_from_slice(piece);
        }
        Ok(Fragment { storage })
    }

    /// Decoded copy of the header.
    pub fn header(&self) -> FragmentHeader {
        FragmentHeader::read(&self.storage)
    }

    /// Marker word as stored.
    pub fn header_marker(&self) -> u32 {
        self.read_u32(MARKER_OFFSET)
    }

    /// Header version as stored.
    pub fn version(&self) -> u32 {
        self.read_u32(VERSION_OFFSET)
    }

    /// Total size recorded in the header.
    pub fn size(&self) -> u64 {
        self.read_u64(SIZE_OFFSET)
    }

    /// Number of bytes of storage this fragment owns.
    pub fn total_size_bytes(&self) -> usize {
        self.storage.len()
    }

    /// Trigger number.
    pub fn trigger_number(&self) -> u64 {
        self.read_u64(TRIGGER_NUMBER_OFFSET)
    }

    /// Set the trigger number.
    pub fn set_trigger_number(&mut self, value: u64) {
        self.write_u64(TRIGGER_NUMBER_OFFSET, value);
    }

    /// Trigger timestamp.
    pub fn trigger_timestamp(&self) -> u64 {
        self.read_u64(TRIGGER_TIMESTAMP_OFFSET)
    }

    /// Set the trigger timestamp.
    pub fn set_trigger_timestamp(&mut self, value: u64) {
        self.write_u64(TRIGGER_TIMESTAMP_OFFSET, value);
    }

    /// First timestamp of the readout window.
    pub fn window_begin(&self) -> u64 {
        self.read_u64(WINDOW_BEGIN_OFFSET)
    }

    /// Set the first timestamp of the readout window.
    pub fn set_window_begin(&mut self, value: u64) {
        self.write_u64(WINDOW_BEGIN_OFFSET, value);
    }

    /// Last timestamp of the readout window.
    pub fn window_end(&self) -> u64 {
        self.read_u64(WINDOW_END_OFFSET)
    }

    /// Set the last timestamp of the readout window.
    pub fn set_window_end(&mut self, value: u64) {
        self.write_u64(WINDOW_END_OFFSET, value);
    }

    /// Run number.
    pub fn run_number(&self) -> u32 {
        self.read_u32(RUN_NUMBER_OFFSET)
    }

    /// Set the run number.
    pub fn set_run_number(&mut self, value: u32) {
        self.write_u32(RUN_NUMBER_OFFSET, value);
    }

    /// Link the data was read from.
    pub fn link_id(&self) -> GeoId {
        GeoId {
            apa_number: self.read_u32(APA_NUMBER_OFFSET),
            link_number: self.read_u32(LINK_NUMBER_OFFSET),
        }
    }

    /// Set the link the data was read from.
    pub fn set_link_id(&mut self, link_id: GeoId) {
        self.write_u32(APA_NUMBER_OFFSET, link_id.apa_number);
        self.write_u32(LINK_NUMBER_OFFSET, link_id.link_number);
    }

    /// Raw error bit set.
    pub fn error_bits(&self) -> u32 {
        self.read_u32(ERROR_BITS_OFFSET)
    }

    /// Replace the whole error bit set.
    pub fn set_error_bits(&mut self, bits: u32) {
        self.write_u32(ERROR_BITS_OFFSET, bits);
    }

    /// Whether an error bit is set.
    pub fn error_bit(&self, bit: FragmentErrorBit) -> bool {
        self.error_bits() & (1 << bit.index()) != 0
    }

    /// Set or clear one error bit.
    pub fn set_error_bit(&mut self, bit: FragmentErrorBit, value: bool) {
        let mask = 1u32 << bit.index();
        let bits = if value {
            self.error_bits() | mask
        } else {
            self.error_bits() & !mask
        };
        self.set_error_bits(bits);
    }

    /// Payload type code.
    pub fn fragment_type_code(&self) -> u32 {
        self.read_u32(FRAGMENT_TYPE_OFFSET)
    }

    /// Set the payload type code.
    pub fn set_fragment_type_code(&mut self, value: u32) {
        self.write_u32(FRAGMENT_TYPE_OFFSET, value);
    }

    /// Payload bytes, everything after the header.
    pub fn data(&self) -> &[u8] {
        &self.storage[FRAGMENT_HEADER_SIZE..]
    }

    /// Mutable payload bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.storage[FRAGMENT_HEADER_SIZE..]
    }

    /// The whole buffer, header first.
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Give up the buffer.
    pub fn into_storage(self) -> Vec<u8> {
        self.storage
    }

    fn read_u64(&self, offset: usize) -> u64 {
        LittleEndian::read_u64(&self.storage[offset..])
    }

    fn read_u32(&self, offset: usize) -> u32 {
        LittleEndian::read_u32(&self.storage[offset..])
    }

    fn write_u64(&mut self, offset: usize, value: u64) {
        LittleEndian::write_u64(&mut self.storage[offset..], value);
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        LittleEndian::write_u32(&mut self.storage[offset..], value);
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("trigger_number", &self.trigger_number())
            .field("run_number", &self.run_number())
            .field("link_id", &self.link_id())
            .field("size", &self.size())
            .field("total_size_bytes", &self.total_size_bytes())
            .finish()
    }
}

fn declared_size(bytes: &[u8]) -> RecordResult<usize> {
    if bytes.len() < FRAGMENT_HEADER_SIZE {
        return Err(RecordError::BufferTooShort {
            required: FRAGMENT_HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    let declared = LittleEndian::read_u64(&bytes[SIZE_OFFSET..]);
    if declared < FRAGMENT_HEADER_SIZE as u64 {
        return Err(RecordError::InvalidSize {
            declared,
            minimum: FRAGMENT_HEADER_SIZE,
        });
    }
    size_to_usize(declared)
}
