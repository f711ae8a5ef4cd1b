//! Explicit memoization of pipeline results, keyed by the identity of the input
//! files (path, modification time, length). The store is injected, so callers
//! decide whether results live for one run, a whole session, or not at all.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;

use crate::error::{Result, SurveyError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceId {
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|source| SurveyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceId {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// Identity of every file a cached value was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<SourceId>);

impl CacheKey {
    pub fn for_sources(paths: &[&Path]) -> Result<Self> {
        let ids = paths
            .iter()
            .map(|path| SourceId::from_path(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(CacheKey(ids))
    }

    pub fn sources(&self) -> &[SourceId] {
        &self.0
    }
}

pub trait CacheStore<V> {
    fn get(&self, key: &CacheKey) -> Option<Arc<V>>;

    fn insert(&mut self, key: CacheKey, value: Arc<V>);

    /// Return the cached value for `key`, computing and storing it on a miss.
    /// A failed computation stores nothing.
    fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
        Self: Sized,
    {
        if let Some(value) = self.get(&key) {
            debug!("Cache hit for {} sources", key.sources().len());
            return Ok(value);
        }
        let value = Arc::new(compute()?);
        self.insert(key, Arc::clone(&value));
        Ok(value)
    }
}

#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: HashMap<CacheKey, Arc<V>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        MemoryCache { entries: HashMap::new() }
    }
}

impl<V> MemoryCache<V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> CacheStore<V> for MemoryCache<V> {
    fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, value: Arc<V>) {
        self.entries.insert(key, value);
    }
}

/// Store that never remembers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl<V> CacheStore<V> for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<Arc<V>> {
        None
    }

    fn insert(&mut self, _key: CacheKey, _value: Arc<V>) {}
}
