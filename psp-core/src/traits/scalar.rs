//! Fixed-width scalar types stored in PSP dumps
//!
//! Every numeric field in the format is one of a handful of little-endian
//! scalars. This module ties each Rust type to its on-disk width and kind.

use core::fmt;

/// On-disk scalar kind of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarKind {
    I32,
    I64,
    F32,
    F64,
}

impl ScalarKind {
    /// Get the size in bytes for this kind
    pub const fn size_bytes(&self) -> usize {
        match self {
            ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::F64 => 8,
        }
    }

    /// Whether the kind is a floating point type
    pub const fn is_float(&self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Trait for types that can be read from a PSP byte stream
///
/// Header words are unsigned; record fields use the types named by
/// [`ScalarKind`].
pub trait Scalar: Copy + PartialEq + Sized {
    /// Width in bytes on disk
    const WIDTH: usize = core::mem::size_of::<Self>();

    /// Decode from exactly `WIDTH` little-endian bytes
    ///
    /// Callers guarantee `bytes.len() >= WIDTH`.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($type:ty),*) => {$(
        impl Scalar for $type {
            #[inline]
            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut array = [0u8; core::mem::size_of::<$type>()];
                array.copy_from_slice(&bytes[..core::mem::size_of::<$type>()]);
                <$type>::from_le_bytes(array)
            }
        }
    )*};
}

impl_scalar!(i32, i64, u32, u64, f32, f64);
