//! Error types for PSP decoding

use alloc::string::String;

/// Errors that can occur while decoding a PSP dump
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PspError {
    /// A read demanded more bytes than remain in the source
    #[error("truncated input: needed {needed} bytes at offset {offset}, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Seek past the end of the source
    #[error("offset {offset} is out of bounds for a source of {len} bytes")]
    OutOfBounds { offset: usize, len: usize },
    /// A component header is structurally invalid
    #[error("malformed header for component {component}: {reason}")]
    MalformedHeader {
        component: usize,
        reason: &'static str,
    },
    /// The global header declares more components than the stream holds
    #[error("unexpected end of file: {declared} components declared, {decoded} decoded")]
    UnexpectedEndOfFile { declared: usize, decoded: usize },
    /// No component with the requested name exists
    #[error("unknown component '{0}'")]
    UnknownComponent(String),
    /// Two components in one file share a name
    #[error("duplicate component name '{0}'")]
    DuplicateComponent(String),
    /// A size or offset computation overflowed
    #[error("size computation overflowed")]
    SizeOverflow,
    /// Bytes remain after the last declared component
    #[error("{len} trailing bytes after the last component at offset {offset}")]
    TrailingData { offset: usize, len: usize },
    /// The global body count disagrees with the component headers
    #[error("global header declares {declared} bodies, components hold {actual}")]
    BodyCountMismatch { declared: u64, actual: u64 },
}

impl PspError {
    /// Whether this error invalidates the whole directory scan
    pub fn is_fatal_to_scan(&self) -> bool {
        !matches!(self, PspError::UnknownComponent(_))
    }
}

/// Result type for PSP decoding
pub type Result<T> = core::result::Result<T, PspError>;
