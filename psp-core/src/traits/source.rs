//! Byte source trait
//!
//! A PSP dump is decoded from any read-only, byte-addressable source:
//! memory-mapped files, owned buffers, borrowed slices.

use alloc::vec::Vec;

/// Trait for read-only sources holding a complete PSP dump
///
/// The bytes must not change for as long as the source is alive; decoded
/// offsets are only valid against the exact bytes they were computed from.
pub trait ByteSource {
    /// Get the complete contents of the source
    fn as_slice(&self) -> &[u8];

    /// Get the size of the source in bytes
    fn size(&self) -> usize {
        self.as_slice().len()
    }
}

impl ByteSource for Vec<u8> {
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl ByteSource for &[u8] {
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    fn as_slice(&self) -> &[u8] {
        self
    }
}
