//! Buffer-backed records for the DAQ data path
//!
//! This crate defines the records that travel between applications and how
//! they cross the serialization boundary:
//! - BufferAdoption: copy-or-take-over construction parameter
//! - Fragment: header + payload produced by one readout link
//! - TriggerRecordHeader: header + list of requested components
//! - RecordError: construction failures (short buffers, bad sizes, allocation)
//! - adapters: serde `Serialize`/`Deserialize` for both records, with a raw
//!   binary blob for MessagePack and a list of byte values for JSON
//!
//! Neither record is default-constructible; every instance owns exactly one
//! contiguous buffer holding its header followed by its variable-length part.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod buffer;
pub mod error;
pub mod fragment;
pub mod geo_id;
pub mod trigger_record_header;

pub use adapters::BufferBacked;
pub use buffer::{BufferAdoption, BufferAdoptionMode};
pub use error::{RecordError, RecordResult};
pub use fragment::{Fragment, FragmentErrorBit, FragmentHeader, FRAGMENT_HEADER_SIZE};
pub use geo_id::GeoId;
pub use trigger_record_header::{
    ComponentRequest, TriggerRecordErrorBit, TriggerRecordHeader, COMPONENT_REQUEST_SIZE,
    TRIGGER_RECORD_HEADER_SIZE,
};
