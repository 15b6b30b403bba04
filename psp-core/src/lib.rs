#![no_std]

//! PSP Core - EXP Phase-Space Protocol Format Definitions
//!
//! This crate provides the pure format layer for PSP dumps: wire constants,
//! header decoding, record layout resolution and parameter decoding. It
//! performs no I/O; everything operates on byte slices. YAML info blocks are
//! decoded with the `yaml` feature.

extern crate alloc;

pub mod cursor;
pub mod error;
pub mod format;
pub mod traits;
pub mod validation;

pub use cursor::ByteCursor;
pub use error::*;
pub use format::*;
pub use traits::*;
pub use validation::{
    block_len, decode_parameters, encode_parameters, validate_block, ParamValue, Parameters,
};
