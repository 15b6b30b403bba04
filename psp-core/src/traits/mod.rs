//! Abstract interfaces for the PSP format layer
//!
//! Traits are pure interfaces; concrete byte sources live in the `psp` crate.

pub mod scalar;
pub mod source;

pub use scalar::{Scalar, ScalarKind};
pub use source::ByteSource;
