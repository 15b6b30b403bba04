//! Caller-owned memoization of decoded particle tables
//!
//! A [`TableCache`] belongs to one open file. Lookups take a shared lock;
//! decoding happens outside any lock, and the first table inserted for a
//! name is the one every caller sees.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::table::ParticleTable;
use crate::Result;

/// Decoded tables keyed by component name
#[derive(Debug, Default)]
pub struct TableCache {
    tables: RwLock<HashMap<String, Arc<ParticleTable>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table for `name`, if one has been decoded
    pub fn get(&self, name: &str) -> Option<Arc<ParticleTable>> {
        self.tables.read().get(name).cloned()
    }

    /// Return the cached table for `name`, decoding it with `load` if absent
    ///
    /// Concurrent callers may both run `load`; only the first result is
    /// kept and returned to both. A failed decode leaves the cache
    /// unchanged.
    pub fn get_or_try_insert_with<F>(&self, name: &str, load: F) -> Result<Arc<ParticleTable>>
    where
        F: FnOnce() -> Result<ParticleTable>,
    {
        if let Some(table) = self.get(name) {
            return Ok(table);
        }

        let table = Arc::new(load()?);
        let mut tables = self.tables.write();
        Ok(tables.entry(name.to_string()).or_insert(table).clone())
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }

    /// Names with a cached table, in no particular order
    pub fn names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    /// Drop the cached table for `name`
    pub fn remove(&self, name: &str) -> Option<Arc<ParticleTable>> {
        self.tables.write().remove(name)
    }

    pub fn clear(&self) {
        self.tables.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use crate::Error;
    use psp_core::PspError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table(name: &str, value: f64) -> ParticleTable {
        ParticleTable::new(name.into(), vec![("m".into(), Column::F64(vec![value]))], 1)
    }

    #[test]
    fn test_insert_once() {
        let cache = TableCache::new();
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(table("halo", 1.0))
        };

        let first = cache.get_or_try_insert_with("halo", load).unwrap();
        let second = cache.get_or_try_insert_with("halo", load).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.names(), ["halo"]);
    }

    #[test]
    fn test_failed_load_not_cached() {
        let cache = TableCache::new();
        let err = cache
            .get_or_try_insert_with("disk", || {
                Err(Error::Decode(PspError::UnknownComponent("disk".into())))
            })
            .unwrap_err();
        assert!(matches!(err.psp_error(), Some(PspError::UnknownComponent(_))));
        assert!(cache.is_empty());
        assert!(cache.get("disk").is_none());
    }

    #[test]
    fn test_concurrent_first_insert_wins() {
        let cache = TableCache::new();
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    s.spawn(move || {
                        cache
                            .get_or_try_insert_with("halo", || Ok(table("halo", i as f64)))
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let cached = cache.get("halo").unwrap();
        for table in &results {
            assert!(Arc::ptr_eq(table, &cached));
        }
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = TableCache::new();
        cache.get_or_try_insert_with("a", || Ok(table("a", 0.0))).unwrap();
        cache.get_or_try_insert_with("b", || Ok(table("b", 0.0))).unwrap();
        assert!(cache.remove("a").is_some());
        assert!(cache.remove("a").is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
