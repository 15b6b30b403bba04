//! Binary format definitions for PSP dumps
//!
//! This module contains the wire layout of the global header, component
//! headers, and particle records. No I/O; decoding works on a [`ByteCursor`].
//!
//! [`ByteCursor`]: crate::ByteCursor

pub mod constants;
pub mod header;
pub mod layout;
#[cfg(feature = "yaml")]
mod yaml;

pub use header::{ComponentHeader, ComponentInfo, GlobalHeader, Precision};
pub use layout::{Field, RecordLayout};
