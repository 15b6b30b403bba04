//! Open PSP files
//!
//! A [`PspFile`] owns its byte source and the component directory built
//! when it was opened. Headers are available immediately; particle data is
//! decoded per component on request.

use log::debug;
use psp_core::{ByteSource, GlobalHeader, PspError};
use rayon::prelude::*;
use std::{fmt, path::Path, sync::Arc};

use crate::cache::TableCache;
use crate::directory::{scan, ComponentDescriptor, ComponentDirectory};
use crate::materialize::materialize;
use crate::source::FileSource;
use crate::table::ParticleTable;
use crate::{ReadOptions, Result};

/// A scanned PSP dump
#[derive(Debug)]
pub struct PspFile<S = FileSource> {
    source: S,
    directory: ComponentDirectory,
    options: ReadOptions,
}

impl PspFile<FileSource> {
    /// Open a file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ReadOptions::default())
    }

    /// Open a file with the given options
    pub fn open_with<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let source = FileSource::open(path.as_ref(), &options)?;
        debug!(
            "opened {} ({} bytes, mapped: {})",
            path.as_ref().display(),
            source.size(),
            source.is_mapped()
        );
        Self::from_source(source, options)
    }
}

impl PspFile<Vec<u8>> {
    /// Read a dump held in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_source(bytes, ReadOptions::default())
    }
}

impl<S: ByteSource> PspFile<S> {
    /// Scan `source` and take ownership of it
    ///
    /// Fails if the directory scan fails; no handle exists for a dump whose
    /// headers do not decode.
    pub fn from_source(source: S, options: ReadOptions) -> Result<Self> {
        let directory = scan(source.as_slice(), &options)?;
        Ok(Self {
            source,
            directory,
            options,
        })
    }

    pub fn directory(&self) -> &ComponentDirectory {
        &self.directory
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn global_header(&self) -> Option<&GlobalHeader> {
        self.directory.global_header()
    }

    /// Simulation time of the dump
    pub fn time(&self) -> f64 {
        self.directory.time()
    }

    /// Sum of the particle counts of all components
    pub fn total_bodies(&self) -> u64 {
        self.directory.total_bodies()
    }

    /// Component names in file order
    pub fn component_names(&self) -> Vec<&str> {
        self.directory.names().collect()
    }

    pub fn components(&self) -> &[ComponentDescriptor] {
        self.directory.components()
    }

    /// Descriptor of the component called `name`
    pub fn header(&self, name: &str) -> Result<&ComponentDescriptor> {
        self.directory
            .get(name)
            .ok_or_else(|| PspError::UnknownComponent(name.to_string()).into())
    }

    /// Descriptor of the component at `index`
    pub fn component(&self, index: usize) -> Option<&ComponentDescriptor> {
        self.directory.get_index(index)
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Decode the particle records of `name`
    ///
    /// Decodes at most `max_bodies` records when a body limit is set.
    pub fn load(&self, name: &str) -> Result<ParticleTable> {
        let descriptor = self.header(name)?;
        let limit = self
            .options
            .record_limit(descriptor.particle_count as usize);
        Ok(materialize(self.source.as_slice(), descriptor, limit)?)
    }

    /// Decode `name` through `cache`, reusing an earlier result
    pub fn load_cached(&self, name: &str, cache: &TableCache) -> Result<Arc<ParticleTable>> {
        self.header(name)?;
        cache.get_or_try_insert_with(name, || self.load(name))
    }

    /// Give the byte source back
    pub fn into_source(self) -> S {
        self.source
    }

    /// Every component descriptor as a JSON array
    #[cfg(feature = "serde")]
    pub fn headers_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.directory.components())?)
    }
}

impl<S: ByteSource + Sync> PspFile<S> {
    /// Decode every component in parallel through `cache`
    ///
    /// Tables are returned in file order.
    pub fn load_all(&self, cache: &TableCache) -> Result<Vec<Arc<ParticleTable>>> {
        self.directory
            .components()
            .par_iter()
            .map(|c| self.load_cached(&c.name, cache))
            .collect()
    }
}

impl<S> fmt::Display for PspFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<PSP {} bodies; {} components: ",
            self.directory.total_bodies(),
            self.directory.len()
        )?;
        for (i, name) in self.directory.names().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name:?}")?;
        }
        f.write_str(">")
    }
}
