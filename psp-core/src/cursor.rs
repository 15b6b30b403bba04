//! Bounded byte cursor over a PSP dump
//!
//! Each read consumes exactly the bytes it promises or fails without moving
//! the cursor, so there is no partial-read ambiguity.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{PspError, Result, Scalar};

/// Sequential/random-access reader over a fixed byte slice
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current absolute offset
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying slice
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether the cursor sits at the end of the data
    pub const fn at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Move to an absolute offset
    ///
    /// Seeking exactly to the end is allowed; anything past it is not.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(PspError::OutOfBounds {
                offset,
                len: self.data.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Advance `n` bytes without decoding them
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Read one scalar
    #[inline]
    pub fn read<T: Scalar>(&mut self) -> Result<T> {
        self.read_bytes(T::WIDTH).map(T::from_le_slice)
    }

    /// Read `count` consecutive scalars of the same type
    pub fn read_array<T: Scalar>(&mut self, count: usize) -> Result<Vec<T>> {
        let total = count.checked_mul(T::WIDTH).ok_or(PspError::SizeOverflow)?;
        let bytes = self.read_bytes(total)?;
        Ok(bytes.chunks_exact(T::WIDTH).map(T::from_le_slice).collect())
    }

    /// Look at the next `u32` without consuming it
    pub fn peek_u32(&self) -> Result<u32> {
        if self.remaining() < 4 {
            return Err(self.truncated(4));
        }
        Ok(u32::from_le_slice(&self.data[self.pos..]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read()
    }

    /// Read an `n`-byte text field
    ///
    /// The text ends at the first NUL byte or after `n` bytes, whichever
    /// comes first. The cursor always advances by `n`. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_bytes(n)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    fn truncated(&self, needed: usize) -> PspError {
        PspError::TruncatedInput {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }
}
