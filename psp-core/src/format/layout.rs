//! Particle record layout
//!
//! A record is the optional i64 sequence index, eight floating core fields
//! (mass, position, velocity, potential), `nint` i32 attributes and then
//! `nfloat` floating attributes. The attribute order is part of the wire
//! format.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::constants::{CORE_FLOAT_NAMES, INDEX_NAME, INDEX_WIDTH, INT_ATTR_WIDTH};
use super::header::Precision;
use crate::ScalarKind;

/// One field of a particle record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    /// Column name
    pub name: String,
    /// On-disk scalar kind
    pub kind: ScalarKind,
    /// Byte offset within the record
    pub offset: usize,
}

/// Resolved byte layout of one component's records
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordLayout {
    fields: Vec<Field>,
    stride: usize,
    indexed: bool,
}

impl RecordLayout {
    /// Derive the layout from the declared attribute counts
    pub fn resolve(
        int_attr_count: u32,
        float_attr_count: u32,
        precision: Precision,
        indexed: bool,
    ) -> Self {
        let float_kind = precision.kind();
        let capacity =
            indexed as usize + CORE_FLOAT_NAMES.len() + (int_attr_count + float_attr_count) as usize;
        let mut fields = Vec::with_capacity(capacity);
        let mut offset = 0;

        let mut push = |name: String, kind: ScalarKind| {
            fields.push(Field { name, kind, offset });
            offset += kind.size_bytes();
        };

        if indexed {
            push(INDEX_NAME.to_string(), ScalarKind::I64);
        }
        for name in CORE_FLOAT_NAMES {
            push(name.to_string(), float_kind);
        }
        for i in 0..int_attr_count {
            push(format!("i_attr{i}"), ScalarKind::I32);
        }
        for i in 0..float_attr_count {
            push(format!("f_attr{i}"), float_kind);
        }

        Self {
            fields,
            stride: offset,
            indexed,
        }
    }

    /// Width of the fixed core fields for a precision
    pub const fn core_width(precision: Precision, indexed: bool) -> usize {
        let index = if indexed { INDEX_WIDTH } else { 0 };
        index + CORE_FLOAT_NAMES.len() * precision.size_bytes()
    }

    /// Compute only the stride, without building the field list
    pub const fn stride_for(
        int_attr_count: u32,
        float_attr_count: u32,
        precision: Precision,
        indexed: bool,
    ) -> usize {
        Self::core_width(precision, indexed)
            + int_attr_count as usize * INT_ATTR_WIDTH
            + float_attr_count as usize * precision.size_bytes()
    }

    /// Bytes per record
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Fields in wire order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether records start with the i64 sequence index
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Number of fields per record
    pub fn width(&self) -> usize {
        self.fields.len()
    }
}
