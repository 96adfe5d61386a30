//! Persistence and freshness checking for the semantic index.
//!
//! Two artifacts live in the configured cache directory:
//!
//! - `vector_index.json`: the serialized [`FlatVectorIndex`]
//! - `metadata.json`: an [`IndexMetadata`] record with the catalog
//!   fingerprint the index was built from
//!
//! A persisted index is trusted only when both files exist and the stored
//! fingerprint equals the live catalog's fingerprint.

use std::path::{Path, PathBuf};

use opscout_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::index::FlatVectorIndex;

/// File name of the serialized vector index.
pub const INDEX_FILE: &str = "vector_index.json";

/// File name of the index metadata record.
pub const METADATA_FILE: &str = "metadata.json";

/// Metadata stored alongside a persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Catalog fingerprint at build time.
    pub content_fingerprint: String,

    /// Build time, seconds since the Unix epoch.
    pub created_at: i64,

    /// Number of records embedded.
    #[serde(default)]
    pub document_count: usize,

    /// Embedding dimension.
    #[serde(default)]
    pub embedding_dimension: usize,

    /// Embedding provider name.
    #[serde(default)]
    pub provider: String,
}

impl IndexMetadata {
    /// Metadata for an index built now.
    pub fn now(
        content_fingerprint: impl Into<String>,
        document_count: usize,
        embedding_dimension: usize,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            content_fingerprint: content_fingerprint.into(),
            created_at: chrono::Utc::now().timestamp(),
            document_count,
            embedding_dimension,
            provider: provider.into(),
        }
    }
}

/// Locations of the persisted artifacts under a cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    /// Cache directory.
    pub dir: PathBuf,
    /// Serialized index.
    pub index: PathBuf,
    /// Metadata record.
    pub metadata: PathBuf,
}

impl IndexPaths {
    /// Standard artifact paths under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            index: dir.join(INDEX_FILE),
            metadata: dir.join(METADATA_FILE),
            dir,
        }
    }

    /// Whether both artifacts exist.
    pub fn exist(&self) -> bool {
        self.index.is_file() && self.metadata.is_file()
    }
}

/// Check if a persisted index matches the current fingerprint.
///
/// Returns `false` for a missing or malformed metadata file and for an
/// empty `current_fingerprint`.
pub fn is_index_fresh(metadata_path: &Path, current_fingerprint: &str) -> bool {
    if current_fingerprint.is_empty() {
        return false;
    }
    match load_metadata(metadata_path) {
        Ok(metadata) => metadata.content_fingerprint == current_fingerprint,
        Err(_) => false,
    }
}

/// Save index metadata to a JSON file.
pub fn save_metadata(metadata_path: &Path, metadata: &IndexMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    write_replacing(metadata_path, &json)
}

/// Load index metadata from a JSON file.
pub fn load_metadata(metadata_path: &Path) -> Result<IndexMetadata> {
    let json = std::fs::read_to_string(metadata_path)
        .map_err(|e| Error::io_with_path(e, metadata_path))?;
    let metadata: IndexMetadata = serde_json::from_str(&json)?;
    Ok(metadata)
}

/// Save the vector index blob.
pub fn save_index(index_path: &Path, index: &FlatVectorIndex) -> Result<()> {
    let json = serde_json::to_string(index)?;
    write_replacing(index_path, &json)
}

/// Load the vector index blob.
pub fn load_index(index_path: &Path) -> Result<FlatVectorIndex> {
    let json =
        std::fs::read_to_string(index_path).map_err(|e| Error::io_with_path(e, index_path))?;
    let index: FlatVectorIndex = serde_json::from_str(&json)?;
    Ok(index)
}

/// Write both artifacts, creating the directory if needed.
///
/// The old metadata is removed before the new index is written and the new
/// metadata goes in last, so an interrupted persist leaves no metadata and
/// the next load rebuilds. Each file is replaced by rename.
pub fn persist(paths: &IndexPaths, index: &FlatVectorIndex, metadata: &IndexMetadata) -> Result<()> {
    std::fs::create_dir_all(&paths.dir).map_err(|e| Error::io_with_path(e, &paths.dir))?;
    match std::fs::remove_file(&paths.metadata) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io_with_path(e, &paths.metadata)),
    }
    save_index(&paths.index, index)?;
    save_metadata(&paths.metadata, metadata)
}

/// Write `contents` to `<path>.tmp`, then rename it over `path`.
fn write_replacing(path: &Path, contents: &str) -> Result<()> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, contents).map_err(|e| Error::io_with_path(e, &tmp))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::io_with_path(e, path))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::index::VectorEntry;
    use tempfile::tempdir;

    fn sample_metadata() -> IndexMetadata {
        IndexMetadata {
            content_fingerprint: "abc123def456".to_string(),
            created_at: 1_736_942_400,
            document_count: 3,
            embedding_dimension: 4,
            provider: "mock".to_string(),
        }
    }

    fn sample_index() -> FlatVectorIndex {
        FlatVectorIndex::new(
            2,
            vec![VectorEntry {
                position: 0,
                name: "clean_html_mapper".to_string(),
                vector: vec![0.6, 0.8],
            }],
        )
    }

    #[test]
    fn test_metadata_field_names() {
        let json = serde_json::to_string(&sample_metadata()).unwrap();
        assert!(json.contains("\"content_fingerprint\":\"abc123def456\""));
        assert!(json.contains("\"created_at\":1736942400"));
    }

    #[test]
    fn test_metadata_minimal_record_loads() {
        let metadata: IndexMetadata =
            serde_json::from_str(r#"{"content_fingerprint": "f", "created_at": 1}"#).unwrap();
        assert_eq!(metadata.content_fingerprint, "f");
        assert_eq!(metadata.document_count, 0);
        assert!(metadata.provider.is_empty());
    }

    #[test]
    fn test_save_and_load_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE);

        save_metadata(&path, &sample_metadata()).unwrap();
        assert_eq!(load_metadata(&path).unwrap(), sample_metadata());
    }

    #[test]
    fn test_is_index_fresh_matching_fingerprint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE);
        save_metadata(&path, &sample_metadata()).unwrap();

        assert!(is_index_fresh(&path, "abc123def456"));
        assert!(!is_index_fresh(&path, "different"));
    }

    #[test]
    fn test_is_index_fresh_rejects_empty_fingerprint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(METADATA_FILE);
        let mut metadata = sample_metadata();
        metadata.content_fingerprint = String::new();
        save_metadata(&path, &metadata).unwrap();

        assert!(!is_index_fresh(&path, ""));
    }

    #[test]
    fn test_is_index_fresh_missing_or_malformed() {
        let dir = tempdir().unwrap();
        assert!(!is_index_fresh(&dir.path().join("nope.json"), "abc"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "not valid json").unwrap();
        assert!(!is_index_fresh(&bad, "abc"));
    }

    #[test]
    fn test_persist_creates_directory() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("nested").join("cache"));
        assert!(!paths.exist());

        persist(&paths, &sample_index(), &sample_metadata()).unwrap();
        assert!(paths.exist());
        assert_eq!(load_index(&paths.index).unwrap(), sample_index());
    }

    #[test]
    fn test_save_metadata_invalid_path() {
        let path = Path::new("/nonexistent/dir/metadata.json");
        assert!(save_metadata(path, &sample_metadata()).is_err());
    }

    #[test]
    fn test_persist_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        persist(&paths, &sample_index(), &sample_metadata()).unwrap();
        persist(&paths, &sample_index(), &sample_metadata()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "{names:?}");
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
    }

    #[test]
    fn test_interrupted_persist_does_not_revalidate_old_metadata() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        persist(&paths, &sample_index(), &sample_metadata()).unwrap();
        assert!(is_index_fresh(&paths.metadata, "abc123def456"));

        // Block the metadata write so the persist stops after the index.
        std::fs::create_dir(temp_path(&paths.metadata)).unwrap();
        let newer = FlatVectorIndex::new(2, Vec::new());
        let metadata = IndexMetadata {
            content_fingerprint: "fedcba".to_string(),
            document_count: 0,
            ..sample_metadata()
        };
        assert!(persist(&paths, &newer, &metadata).is_err());

        assert_eq!(load_index(&paths.index).unwrap(), newer);
        assert!(!paths.exist());
        assert!(!is_index_fresh(&paths.metadata, "abc123def456"));
        assert!(!is_index_fresh(&paths.metadata, "fedcba"));
    }
}
