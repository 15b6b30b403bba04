//! Configuration for opening and decoding PSP files

/// Options controlling how a PSP file is opened and decoded
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Reject trailing bytes and body count mismatches instead of logging them
    pub strict: bool,
    /// Decode at most this many records per component
    pub max_bodies: Option<usize>,
    /// Memory-map files rather than reading them into memory
    pub mmap: bool,
}

impl ReadOptions {
    /// Options that turn every consistency warning into an error
    pub fn strict() -> Self {
        Self::default().with_strict(true)
    }

    /// Set strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Limit the number of records decoded per component
    pub fn with_max_bodies(mut self, max_bodies: usize) -> Self {
        self.max_bodies = Some(max_bodies);
        self
    }

    /// Choose between memory mapping and reading the whole file
    pub fn with_mmap(mut self, mmap: bool) -> Self {
        self.mmap = mmap;
        self
    }

    /// Number of records to decode from a component holding `count`
    pub fn record_limit(&self, count: usize) -> usize {
        self.max_bodies.map_or(count, |max| max.min(count))
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_bodies: None,
            mmap: cfg!(feature = "mmap"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_limit() {
        let options = ReadOptions::default();
        assert_eq!(options.record_limit(10), 10);

        let options = options.with_max_bodies(4);
        assert_eq!(options.record_limit(10), 4);
        assert_eq!(options.record_limit(2), 2);
    }

    #[test]
    fn test_builders() {
        let options = ReadOptions::strict().with_mmap(false);
        assert!(options.strict);
        assert!(!options.mmap);
        assert_eq!(options.max_bodies, None);
    }
}
