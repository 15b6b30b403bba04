//! Error types for reading PSP files

use crate::directory::ComponentDirectory;
use psp_core::PspError;

/// A directory scan that stopped early
///
/// Carries the components decoded before the failure so callers can report
/// how far the scan got. The partial directory is never handed out as a
/// usable file handle.
#[derive(Debug, thiserror::Error)]
#[error("directory scan failed after {} components: {source}", .partial.len())]
pub struct ScanError {
    #[source]
    pub source: PspError,
    pub partial: Box<ComponentDirectory>,
}

impl ScanError {
    /// The underlying decode error
    pub fn kind(&self) -> &PspError {
        &self.source
    }

    /// Components decoded before the failure
    pub fn partial(&self) -> &ComponentDirectory {
        &self.partial
    }
}

/// Errors produced by the PSP reader
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] PspError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid writer input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Decode error behind this error, if any
    pub fn psp_error(&self) -> Option<&PspError> {
        match self {
            Error::Decode(e) => Some(e),
            Error::Scan(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Result type for the PSP reader
pub type Result<T> = std::result::Result<T, Error>;
