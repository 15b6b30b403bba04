//! PSP - Reader for EXP Phase-Space Protocol N-body dumps
//!
//! A PSP dump holds one global header followed by any number of particle
//! components, each with its own header and a block of fixed-layout
//! records. Opening a file scans the headers once; particle records are
//! decoded per component, on demand.
//!
//! ## Architecture
//!
//! - **psp-core**: Pure format definitions, header decoding and record
//!   layout (no I/O)
//! - **psp**: File handles, memory mapping, lazy loading and caching
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use psp::{PspFile, TableCache};
//!
//! fn example() -> psp::Result<()> {
//!     let psp = PspFile::open("OUT.run0.00010")?;
//!     println!("{psp}");
//!
//!     let halo = psp.load("dark halo")?;
//!     if let Some(x) = halo.column("x") {
//!         println!("first x = {:?}", x.get_f64(0));
//!     }
//!
//!     // Decode everything once, in parallel
//!     let cache = TableCache::new();
//!     for table in psp.load_all(&cache)? {
//!         println!("{}: {} particles", table.component(), table.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **mmap** (default): memory-map files instead of reading them whole
//! - **serde** (default): serialize headers and tables, JSON header export
//! - **yaml** (default): decode YAML component info blocks

pub use psp_core::{
    // Format definitions
    ComponentHeader, ComponentInfo, Field, GlobalHeader, Precision, RecordLayout,
    // Parameters
    decode_parameters, encode_parameters, ParamValue, Parameters,
    // Byte access
    ByteCursor, ByteSource, Scalar, ScalarKind,
    // Error handling
    PspError,
};

pub mod cache;
pub mod directory;
pub mod error;
pub mod file;
pub mod materialize;
pub mod options;
pub mod source;
pub mod table;
pub mod writer;

pub use cache::TableCache;
pub use directory::{scan, ComponentDescriptor, ComponentDirectory, DirectoryScanner};
pub use error::{Error, Result, ScanError};
pub use file::PspFile;
pub use materialize::materialize;
pub use options::ReadOptions;
pub use source::FileSource;
pub use table::{Column, ParticleTable};
pub use writer::{ComponentBuilder, Particle, PspWriter};
