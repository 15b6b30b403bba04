//! Column-oriented particle tables
//!
//! A decoded component is one typed column per record field. Columns keep
//! the on-disk scalar type; nothing is widened on load.

use hashbrown::HashMap;
use psp_core::{Scalar, ScalarKind};

/// One typed column of particle data
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Column {
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Column {
    /// Decode one field from a block of fixed-stride records
    ///
    /// `block` must hold whole records; `offset` is the field offset
    /// within a record.
    pub fn decode(kind: ScalarKind, block: &[u8], stride: usize, offset: usize) -> Self {
        fn gather<T: Scalar>(block: &[u8], stride: usize, offset: usize) -> Vec<T> {
            block
                .chunks_exact(stride)
                .map(|record| T::from_le_slice(&record[offset..offset + T::WIDTH]))
                .collect()
        }

        match kind {
            ScalarKind::I32 => Column::I32(gather(block, stride, offset)),
            ScalarKind::I64 => Column::I64(gather(block, stride, offset)),
            ScalarKind::F32 => Column::F32(gather(block, stride, offset)),
            ScalarKind::F64 => Column::F64(gather(block, stride, offset)),
        }
    }

    /// Scalar kind of the column
    pub fn kind(&self) -> ScalarKind {
        match self {
            Column::I32(_) => ScalarKind::I32,
            Column::I64(_) => ScalarKind::I64,
            Column::F32(_) => ScalarKind::F32,
            Column::F64(_) => ScalarKind::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::I32(v) => v.len(),
            Column::I64(v) => v.len(),
            Column::F32(v) => v.len(),
            Column::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `row` widened to f64
    pub fn get_f64(&self, row: usize) -> Option<f64> {
        match self {
            Column::I32(v) => v.get(row).map(|&x| x as f64),
            Column::I64(v) => v.get(row).map(|&x| x as f64),
            Column::F32(v) => v.get(row).map(|&x| x as f64),
            Column::F64(v) => v.get(row).copied(),
        }
    }

    /// Whole column widened to f64
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get_f64(i)).collect()
    }

    /// Raw native-endian bytes of the column
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Column::I32(v) => bytemuck::cast_slice(v),
            Column::I64(v) => bytemuck::cast_slice(v),
            Column::F32(v) => bytemuck::cast_slice(v),
            Column::F64(v) => bytemuck::cast_slice(v),
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            Column::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Column::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Column::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Column::F64(v) => Some(v),
            _ => None,
        }
    }
}

/// Decoded particle data of one component
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParticleTable {
    component: String,
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    lookup: HashMap<String, usize>,
}

impl ParticleTable {
    /// Assemble a table from labeled columns of equal length
    pub(crate) fn new(component: String, labeled: Vec<(String, Column)>, rows: usize) -> Self {
        debug_assert!(labeled.iter().all(|(_, c)| c.len() == rows));
        let mut names = Vec::with_capacity(labeled.len());
        let mut columns = Vec::with_capacity(labeled.len());
        let mut lookup = HashMap::with_capacity(labeled.len());
        for (i, (name, column)) in labeled.into_iter().enumerate() {
            lookup.insert(name.clone(), i);
            names.push(name);
            columns.push(column);
        }
        Self {
            component,
            names,
            columns,
            rows,
            lookup,
        }
    }

    /// Name of the component the table was decoded from
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in record order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.lookup.get(name).map(|&i| &self.columns[i])
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Iterate over `(name, column)` pairs in record order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Take the labeled columns
    pub fn into_columns(self) -> Vec<(String, Column)> {
        self.names.into_iter().zip(self.columns).collect()
    }
}
