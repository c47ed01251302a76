//! Buffer adoption: how a record obtains its storage
//!
//! A record is always built over an existing buffer. The caller decides, once,
//! at construction time, whether the record copies the bytes into storage of
//! its own or takes the buffer over outright.
//!
//! | Variant | Allocates | Caller's buffer afterwards |
//! |---------|-----------|----------------------------|
//! | `CopyFromBuffer(&[u8])` | yes | untouched, lifetime independent |
//! | `TakeOverBuffer(Vec<u8>)` | no | moved into the record |

use crate::error::{RecordError, RecordResult};

/// Which adoption a construction used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferAdoptionMode {
    /// Record allocates and copies
    CopyFromBuffer,
    /// Record assumes sole ownership of the caller's buffer
    TakeOverBuffer,
}

/// Construction parameter carrying the buffer a record is built over.
#[derive(Debug)]
pub enum BufferAdoption<'a> {
    /// Copy the borrowed bytes into freshly allocated storage.
    CopyFromBuffer(&'a [u8]),
    /// Move the vector into the record; no bytes are copied.
    TakeOverBuffer(Vec<u8>),
}

impl<'a> BufferAdoption<'a> {
    /// The adoption mode this parameter selects.
    pub fn mode(&self) -> BufferAdoptionMode {
        match self {
            BufferAdoption::CopyFromBuffer(_) => BufferAdoptionMode::CopyFromBuffer,
            BufferAdoption::TakeOverBuffer(_) => BufferAdoptionMode::TakeOverBuffer,
        }
    }

    /// Bytes visible through this parameter.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            BufferAdoption::CopyFromBuffer(bytes) => bytes,
            BufferAdoption::TakeOverBuffer(vec) => vec.as_slice(),
        }
    }

    /// Number of bytes visible through this parameter.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce owned storage holding exactly the first `len` bytes.
    ///
    /// Copy mode allocates fallibly; take-over mode truncates in place.
    pub(crate) fn into_storage(self, len: usize) -> RecordResult<Vec<u8>> {
        let available = self.len();
        if available < len {
            return Err(RecordError::BufferTooShort {
                required: len,
                actual: available,
            });
        }
        match self {
            BufferAdoption::CopyFromBuffer(bytes) => {
                let mut storage = Vec::new();
                storage
                    .try_reserve_exact(len)
                    .map_err(|_| RecordError::Allocation { requested: len })?;
                storage.extend_from_slice(&bytes[..len]);
                Ok(storage)
            }
            BufferAdoption::TakeOverBuffer(mut vec) => {
                vec.truncate(len);
                Ok(vec)
            }
        }
    }
}

/// Allocate zeroed storage, reporting failure instead of aborting.
pub(crate) fn allocate_zeroed(len: usize) -> RecordResult<Vec<u8>> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(len)
        .map_err(|_| RecordError::Allocation { requested: len })?;
    storage.resize(len, 0);
    Ok(storage)
}

/// Convert a size read from a header into `usize`.
pub(crate) fn size_to_usize(size: u64) -> RecordResult<usize> {
    usize::try_from(size).map_err(|_| RecordError::SizeOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode() {
        let bytes = [1u8, 2, 3];
        assert_eq!(
            BufferAdoption::CopyFromBuffer(&bytes).mode(),
            BufferAdoptionMode::CopyFromBuffer
        );
        assert_eq!(
            BufferAdoption::TakeOverBuffer(bytes.to_vec()).mode(),
            BufferAdoptionMode::TakeOverBuffer
        );
    }

    #[test]
    fn test_copy_is_independent() {
        let mut source = vec![1u8, 2, 3, 4];
        let storage = BufferAdoption::CopyFromBuffer(&source).into_storage(4).unwrap();
        source[0] = 99;
        assert_eq!(storage, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_takes_prefix() {
        let source = [1u8, 2, 3, 4, 5];
        let storage = BufferAdoption::CopyFromBuffer(&source).into_storage(3).unwrap();
        assert_eq!(storage, vec![1, 2, 3]);
    }

    #[test]
    fn test_take_over_keeps_allocation() {
        let source = vec![7u8; 16];
        let ptr = source.as_ptr();
        let storage = BufferAdoption::TakeOverBuffer(source).into_storage(8).unwrap();
        assert_eq!(storage.len(), 8);
        assert_eq!(storage.as_ptr(), ptr);
    }

    #[test]
    fn test_short_buffer() {
        let err = BufferAdoption::CopyFromBuffer(&[1, 2]).into_storage(3).unwrap_err();
        assert_eq!(
            err,
            RecordError::BufferTooShort {
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_allocate_zeroed() {
        assert_eq!(allocate_zeroed(4).unwrap(), vec![0; 4]);
        assert!(matches!(
            allocate_zeroed(usize::MAX),
            Err(RecordError::Allocation { .. })
        ));
    }
}
