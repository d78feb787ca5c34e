//! Fetch caches keyed by resource.
//!
//! The disk cache is what makes a run resumable: every successfully fetched
//! page is written before it is returned, so an interrupted run picks up
//! where it stopped. The in-memory cache backs tests and dry runs.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Key-value store for fetched page bodies.
pub trait PageCache {
    /// Returns the cached body for `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Stores `body` under `key`, replacing any previous entry.
    fn put(&self, key: &str, body: &str) -> Result<(), CacheError>;
}

/// Cache of plain files under a root directory; keys are relative paths.
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl PageCache for DiskCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn put(&self, key: &str, body: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        // A truncated page must never read back as a hit.
        let io_err = |source| CacheError::Io {
            path: path.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(path.parent().unwrap_or(&self.root))
            .map_err(io_err)?;
        tmp.write_all(body.as_bytes()).map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

/// Thread-safe in-memory cache with no expiry.
#[derive(Default)]
pub struct MemoryCache {
    store: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes all entries from the cache.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl PageCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, body: &str) -> Result<(), CacheError> {
        self.store.insert(key.to_string(), body.to_string());
        Ok(())
    }
}

impl<C: PageCache + ?Sized> PageCache for &C {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, body: &str) -> Result<(), CacheError> {
        (**self).put(key, body)
    }
}
