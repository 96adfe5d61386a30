//! Catalog providers.
//!
//! The catalog-building step is external to opscout; the engine only sees a
//! [`CatalogProvider`] that hands back an ordered list of records and can be
//! asked to reload it.
//!
//! # Providers
//!
//! - [`StaticCatalogProvider`]: in-memory records, swappable at runtime
//! - [`JsonCatalogProvider`]: a JSON array of records on disk

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, info};

use crate::catalog::OperatorRecord;
use crate::error::{Error, Result};

/// Source of operator records.
///
/// Implementations must be `Send + Sync` so a single provider can back a
/// process-wide retriever.
pub trait CatalogProvider: Send + Sync {
    /// The current ordered list of operator records.
    fn catalog(&self) -> Result<Vec<OperatorRecord>>;

    /// Reload records from the underlying source.
    fn refresh(&self) -> Result<()>;

    /// Provider name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ============================================================================
// StaticCatalogProvider
// ============================================================================

/// In-memory catalog provider.
///
/// `refresh()` is a no-op; use [`replace`](Self::replace) to swap contents.
#[derive(Debug, Default)]
pub struct StaticCatalogProvider {
    records: RwLock<Vec<OperatorRecord>>,
}

impl StaticCatalogProvider {
    /// Create a provider over the given records.
    pub fn new(records: Vec<OperatorRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Replace the catalog contents.
    pub fn replace(&self, records: Vec<OperatorRecord>) -> Result<()> {
        let mut guard = self
            .records
            .write()
            .map_err(|e| Error::operation(format!("Catalog lock poisoned: {e}")))?;
        *guard = records;
        Ok(())
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn catalog(&self) -> Result<Vec<OperatorRecord>> {
        let guard = self
            .records
            .read()
            .map_err(|e| Error::operation(format!("Catalog lock poisoned: {e}")))?;
        Ok(guard.clone())
    }

    fn refresh(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "static"
    }
}

// ============================================================================
// JsonCatalogProvider
// ============================================================================

/// Catalog provider backed by a JSON file.
///
/// The file holds an array of records. Both `name`/`description` and the
/// legacy `class_name`/`class_desc` field names are accepted. The file is
/// read lazily on first access and re-read on `refresh()`.
#[derive(Debug)]
pub struct JsonCatalogProvider {
    path: PathBuf,
    records: RwLock<Option<Vec<OperatorRecord>>>,
}

impl JsonCatalogProvider {
    /// Create a provider for the given file. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: RwLock::new(None),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<OperatorRecord>> {
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::io_with_path(e, &self.path))?;
        let records: Vec<OperatorRecord> = serde_json::from_str(&json).map_err(|e| {
            Error::invalid_data(format!(
                "Failed to parse catalog {}: {e}",
                self.path.display()
            ))
        })?;
        info!(
            "Loaded {} operators from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

impl CatalogProvider for JsonCatalogProvider {
    fn catalog(&self) -> Result<Vec<OperatorRecord>> {
        {
            let guard = self
                .records
                .read()
                .map_err(|e| Error::operation(format!("Catalog lock poisoned: {e}")))?;
            if let Some(records) = guard.as_ref() {
                return Ok(records.clone());
            }
        }

        debug!("Catalog not loaded yet, reading {}", self.path.display());
        let records = self.load()?;
        let mut guard = self
            .records
            .write()
            .map_err(|e| Error::operation(format!("Catalog lock poisoned: {e}")))?;
        *guard = Some(records.clone());
        Ok(records)
    }

    fn refresh(&self) -> Result<()> {
        let records = self.load()?;
        let mut guard = self
            .records
            .write()
            .map_err(|e| Error::operation(format!("Catalog lock poisoned: {e}")))?;
        *guard = Some(records);
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}

// ============================================================================
// Tests
// ============================================================================
