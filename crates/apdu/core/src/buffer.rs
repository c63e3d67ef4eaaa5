//! Bounded response buffer
//!
//! Responses are written into caller-owned memory. [`ResponseBuffer`] pairs that
//! memory with a running length so every write is checked against the capacity
//! before any byte is copied.

use std::fmt;

use crate::{Error, Result};

/// A caller-owned byte region with a fixed capacity and a running length
///
/// `len() <= capacity()` always holds. A write that would exceed the capacity
/// fails with [`Error::BufferOverflow`] and leaves the buffer untouched.
pub struct ResponseBuffer<'a> {
    data: &'a mut [u8],
    len: usize,
}

impl<'a> ResponseBuffer<'a> {
    /// Wrap caller memory as an empty response buffer
    pub const fn new(data: &'a mut [u8]) -> Self {
        Self { data, len: 0 }
    }

    /// Total number of bytes the buffer can hold
    pub const fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes written so far
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes that can still be written
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.len
    }

    /// The bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Append bytes at the current length
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        let required = self
            .len
            .checked_add(bytes.len())
            .ok_or(Error::BufferOverflow {
                capacity: self.capacity(),
                required: usize::MAX,
            })?;

        if required > self.capacity() {
            return Err(Error::BufferOverflow {
                capacity: self.capacity(),
                required,
            });
        }

        self.data[self.len..required].copy_from_slice(bytes);
        self.len = required;
        Ok(())
    }

    /// Shorten the written region to `len` bytes, zeroing the discarded tail
    ///
    /// Has no effect if `len` is not smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.data[len..self.len].fill(0);
            self.len = len;
        }
    }

    /// Discard everything written so far
    pub fn clear(&mut self) {
        self.truncate(0);
    }
}

impl AsRef<[u8]> for ResponseBuffer<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for ResponseBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("data", &hex::encode(self.as_slice()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_within_capacity() {
        let mut storage = [0u8; 8];
        let mut buffer = ResponseBuffer::new(&mut storage);
        assert!(buffer.is_empty());

        buffer.extend_from_slice(&[1, 2, 3]).unwrap();
        buffer.extend_from_slice(&[4, 5]).unwrap();
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(buffer.remaining(), 3);

        // Filling exactly to capacity is allowed
        buffer.extend_from_slice(&[6, 7, 8]).unwrap();
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_overflow_leaves_buffer_unchanged() {
        let mut storage = [0u8; 4];
        let mut buffer = ResponseBuffer::new(&mut storage);
        buffer.extend_from_slice(&[0xAA, 0xBB, 0xCC]).unwrap();

        let err = buffer.extend_from_slice(&[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferOverflow {
                capacity: 4,
                required: 5
            }
        ));
        assert_eq!(buffer.as_slice(), &[0xAA, 0xBB, 0xCC]);
        drop(buffer);
        assert_eq!(storage, [0xAA, 0xBB, 0xCC, 0x00]);
    }

    #[test]
    fn test_clear_zeroes_written_bytes() {
        let mut storage = [0u8; 4];
        let mut buffer = ResponseBuffer::new(&mut storage);
        buffer.extend_from_slice(&[9, 9, 9, 9]).unwrap();
        buffer.truncate(2);
        assert_eq!(buffer.as_slice(), &[9, 9]);
        buffer.clear();
        assert!(buffer.is_empty());
        drop(buffer);
        assert_eq!(storage, [0; 4]);
    }
}
