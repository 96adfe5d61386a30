//! Operator catalog model and content fingerprinting.
//!
//! A [`CatalogSnapshot`] is an immutable, ordered view of the operator
//! records together with a content fingerprint. Two snapshots with the same
//! fingerprint index identically, which is what lets the lexical and
//! semantic layers skip rebuilds.
//!
//! # Fingerprint
//!
//! Each record is serialized to canonical JSON (object keys sorted), the
//! per-record strings are sorted, and the sorted list is hashed with BLAKE3.
//! Reordering the catalog therefore does not change the fingerprint, while
//! any change to any field does.

use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Serialize};

/// A named, described operator in the searchable catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRecord {
    /// Unique operator name (e.g. `clean_html_mapper`).
    #[serde(alias = "class_name")]
    pub name: String,

    /// Free-text description. The first sentence doubles as a summary.
    #[serde(alias = "class_desc")]
    pub description: String,

    /// Raw parameter documentation, one `name (type): description` per line.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arguments: String,
}

impl OperatorRecord {
    /// Create a record with no parameter documentation.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arguments: String::new(),
        }
    }

    /// Attach parameter documentation.
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    /// Text scanned by the pattern matcher: `"{name} {description}"`.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    /// Text sent to the embedding provider: `"{name}: {description}"`.
    pub fn embedding_text(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }
}

/// A transient, per-query scored result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    /// Operator name.
    pub name: String,
    /// Strategy-specific score (higher is better).
    pub score: f32,
}

impl RankedHit {
    /// Create a hit.
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Compute the content fingerprint of a catalog.
///
/// Deterministic and independent of record order. Returns an empty string
/// if any record fails to serialize; an empty fingerprint never matches a
/// cached one, so callers rebuild.
pub fn fingerprint<T: Serialize>(records: &[T]) -> String {
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        // Value objects are BTreeMap-backed, so keys come out sorted.
        let canonical = serde_json::to_value(record).and_then(|v| serde_json::to_string(&v));
        match canonical {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("Failed to compute catalog fingerprint: {e}");
                return String::new();
            }
        }
    }
    entries.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for entry in &entries {
        hasher.update(&(entry.len() as u64).to_le_bytes());
        hasher.update(entry.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// An immutable, fingerprinted view of the operator catalog.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    records: Vec<OperatorRecord>,
    fingerprint: String,
}

impl CatalogSnapshot {
    /// Build a snapshot, keeping the first record for any duplicated name.
    pub fn new(records: Vec<OperatorRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let mut unique = Vec::with_capacity(records.len());
        for record in records {
            if seen.insert(record.name.clone()) {
                unique.push(record);
            } else {
                warn!("Duplicate operator name '{}' ignored", record.name);
            }
        }

        let fingerprint = fingerprint(&unique);
        Self {
            records: unique,
            fingerprint,
        }
    }

    /// Records in catalog order.
    pub fn records(&self) -> &[OperatorRecord] {
        &self.records
    }

    /// Content fingerprint (empty if it could not be computed).
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by exact name.
    pub fn get(&self, name: &str) -> Option<&OperatorRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Catalog position of a record by exact name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.name == name)
    }

    /// Whether a record with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
