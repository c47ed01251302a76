//! Dataformats - buffer-backed DAQ records and their wire encodings
//!
//! Records (`Fragment`, `TriggerRecordHeader`) own one contiguous buffer
//! holding a fixed header and a variable-length part. They serialize to
//! either of two encodings and come back byte for byte identical.
//!
//! # Quick Start
//!
//! ```
//! use dataformats::{deserialize, serialize, Fragment, FragmentHeader, SerializationType};
//!
//! let header = FragmentHeader {
//!     trigger_number: 1,
//!     run_number: 3,
//!     ..FragmentHeader::default()
//! };
//! let frag = Fragment::from_pieces(&header, &[&[1, 2, 3, 4]])?;
//!
//! let bytes = serialize(&frag, SerializationType::MsgPack)?;
//! let decoded: Fragment = deserialize(&bytes)?;
//! assert_eq!(decoded.data(), &[1, 2, 3, 4]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - `dataformats-serialization`: encoding selector, prefix framing, limits,
//!   error taxonomy
//! - `dataformats-core`: the records and their serde adapters

pub use dataformats_core::{
    adapters, BufferAdoption, BufferAdoptionMode, BufferBacked, ComponentRequest, Fragment,
    FragmentErrorBit, FragmentHeader, GeoId, RecordError, RecordResult, TriggerRecordErrorBit,
    TriggerRecordHeader, COMPONENT_REQUEST_SIZE, FRAGMENT_HEADER_SIZE, TRIGGER_RECORD_HEADER_SIZE,
};
pub use dataformats_serialization::{
    deserialize, malformed_element, serialize, MalformedElement, MessageCodec, SerializationConfig,
    SerializationError, SerializationResult, SerializationType, DEFAULT_MAX_MESSAGE_BYTES,
    MALFORMED_ELEMENT,
};
