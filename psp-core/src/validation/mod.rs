//! Validation and text-decoding utilities for PSP dumps
//!
//! Pure functions with no I/O: range arithmetic for record blocks and the
//! typed decoder for parameter strings.

pub mod bounds;
pub mod parsing;

pub use bounds::{block_len, validate_block};
pub use parsing::{decode_parameters, encode_parameters, ParamValue, Parameters};
