//! Byte sources backing an open PSP file
//!
//! Files are memory-mapped by default so that opening a dump only touches
//! the header pages; reading into an owned buffer is the fallback.

use psp_core::ByteSource;
#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};
use std::{fs::File, io::Read, path::Path};

use crate::{ReadOptions, Result};

/// Read-only contents of a PSP file on disk
#[derive(Debug)]
pub enum FileSource {
    /// Memory-mapped file
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
    /// File read fully into memory
    Owned(Vec<u8>),
}

impl FileSource {
    /// Open `path` according to `options`
    pub fn open<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;

        #[cfg(feature = "mmap")]
        if options.mmap {
            // Zero-length files cannot be mapped on every platform
            if file.metadata()?.len() > 0 {
                // SAFETY: the mapping is read-only and PSP files are treated as
                // immutable for the lifetime of the handle.
                let mmap = unsafe { MmapOptions::new().map(&file)? };
                return Ok(FileSource::Mapped(mmap));
            }
        }
        #[cfg(not(feature = "mmap"))]
        let _ = options;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(FileSource::Owned(bytes))
    }

    /// Whether the contents are memory-mapped
    pub fn is_mapped(&self) -> bool {
        match self {
            #[cfg(feature = "mmap")]
            FileSource::Mapped(_) => true,
            FileSource::Owned(_) => false,
        }
    }
}

impl ByteSource for FileSource {
    fn as_slice(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            FileSource::Mapped(mmap) => &mmap[..],
            FileSource::Owned(bytes) => &bytes[..],
        }
    }
}
