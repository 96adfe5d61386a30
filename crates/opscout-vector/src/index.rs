//! Flat (brute-force) vector index with cosine similarity.
//!
//! A catalog of a few hundred operators does not need approximate search;
//! scanning every vector per query is exact and fast enough.

use opscout_core::RankedHit;
use serde::{Deserialize, Serialize};

/// One embedded catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Catalog position at build time.
    pub position: usize,
    /// Operator name the vector belongs to.
    pub name: String,
    /// Embedding vector.
    pub vector: Vec<f32>,
}

/// In-memory vector index, serializable as the persisted index blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatVectorIndex {
    dimension: usize,
    entries: Vec<VectorEntry>,
}

impl FlatVectorIndex {
    /// Create an index from entries. All vectors should share `dimension`.
    pub fn new(dimension: usize, entries: Vec<VectorEntry>) -> Self {
        Self { dimension, entries }
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Indexed entries.
    pub fn entries(&self) -> &[VectorEntry] {
        &self.entries
    }

    /// Mutable access for re-pointing positions after a load.
    pub(crate) fn entries_mut(&mut self) -> &mut [VectorEntry] {
        &mut self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest entries to `query`, most similar first.
    ///
    /// Entries with similarity below `threshold` are excluded. Ties keep
    /// catalog order.
    pub fn search(&self, query: &[f32], limit: usize, threshold: f32) -> Vec<RankedHit> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.vector)))
            .filter(|&(_, score)| score >= threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(self.entries[a.0].position.cmp(&self.entries[b.0].position))
        });
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(i, score)| RankedHit::new(self.entries[i].name.clone(), score))
            .collect()
    }
}

/// Cosine similarity; 0.0 when either vector has zero norm or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(position: usize, name: &str, vector: Vec<f32>) -> VectorEntry {
        VectorEntry {
            position,
            name: name.to_string(),
            vector,
        }
    }

    fn index() -> FlatVectorIndex {
        FlatVectorIndex::new(
            2,
            vec![
                entry(0, "east", vec![1.0, 0.0]),
                entry(1, "north", vec![0.0, 1.0]),
                entry(2, "north_east", vec![1.0, 1.0]),
                entry(3, "west", vec![-1.0, 0.0]),
            ],
        )
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let hits = index().search(&[1.0, 0.1], 4, -1.0);
        let names: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["east", "north_east", "north", "west"]);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_search_threshold_excludes_below() {
        let hits = index().search(&[1.0, 0.0], 10, 0.0);
        let names: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
        // "north" scores exactly 0.0 and is kept; "west" is below.
        assert_eq!(names, vec!["east", "north_east", "north"]);
    }

    #[test]
    fn test_search_limit() {
        assert_eq!(index().search(&[1.0, 0.0], 1, -1.0).len(), 1);
        assert!(FlatVectorIndex::default().search(&[1.0], 5, 0.0).is_empty());
    }

    #[test]
    fn test_serialization_round_trip_keeps_entries() {
        let json = serde_json::to_string(&index()).unwrap();
        let loaded: FlatVectorIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, index());
        assert_eq!(loaded.dimension(), 2);
    }
}
