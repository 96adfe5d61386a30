//! Content-addressed cache of query results.
//!
//! Each entry is one JSON file named after the BLAKE3 hex digest of the
//! query text followed by the limit, holding the ordered name list. Cache
//! I/O failures are logged and never fail a query.

use std::path::{Path, PathBuf};

use opscout_core::{Error, Result};

/// On-disk query result cache.
#[derive(Debug, Clone)]
pub struct QueryCache {
    dir: PathBuf,
}

impl QueryCache {
    /// Cache stored under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for a query and limit.
    pub fn key(query: &str, limit: usize) -> String {
        blake3::hash(format!("{query}{limit}").as_bytes())
            .to_hex()
            .to_string()
    }

    /// File backing the entry for a query and limit.
    pub fn entry_path(&self, query: &str, limit: usize) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(query, limit)))
    }

    /// Cached names for a query, if present and readable.
    pub fn get(&self, query: &str, limit: usize) -> Option<Vec<String>> {
        let path = self.entry_path(query, limit);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read query cache entry {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(names) => {
                log::debug!("Query cache hit: {}", path.display());
                Some(names)
            }
            Err(e) => {
                log::warn!("Ignoring malformed query cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Store names for a query. Failures are logged.
    pub fn put(&self, query: &str, limit: usize, names: &[String]) {
        if let Err(e) = self.try_put(query, limit, names) {
            log::warn!("Failed to write query cache entry: {e}");
        }
    }

    fn try_put(&self, query: &str, limit: usize, names: &[String]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io_with_path(e, &self.dir))?;
        let path = self.entry_path(query, limit);
        let json = serde_json::to_string(names)?;
        std::fs::write(&path, json).map_err(|e| Error::io_with_path(e, &path))?;
        Ok(())
    }

    /// Delete every cached entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::io_with_path(e, &self.dir)),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| Error::io_with_path(e, &self.dir))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path).map_err(|e| Error::io_with_path(e, &path))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
