//! Weighted Reciprocal Rank Fusion (RRF) of a lexical and a semantic ranking.
//!
//! # Algorithm
//!
//! Each item at 1-based rank `r` in a ranking contributes
//! `weight / (k + r)`; contributions are summed across both rankings. An
//! item missing from one ranking simply gets no term from it. Only rank
//! position matters, so the raw scores of the two retrievers never need to
//! be comparable and the weights directly set each retriever's influence.

use std::collections::HashMap;

use opscout_core::RankedHit;
use serde::{Deserialize, Serialize};

/// Parameters for [`reciprocal_rank_fusion`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionParams {
    /// Weight of the lexical (BM25) ranking.
    pub lexical_weight: f32,
    /// Weight of the semantic (vector) ranking.
    pub semantic_weight: f32,
    /// Smoothing constant added to every rank.
    pub k: f32,
    /// Fused scores must exceed this to be kept.
    pub threshold: f32,
    /// Maximum number of fused results.
    pub limit: usize,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            lexical_weight: 0.5,
            semantic_weight: 0.5,
            k: 60.0,
            threshold: 0.0,
            limit: 10,
        }
    }
}

/// Which ranking(s) a fused item appeared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitSource {
    /// Lexical ranking only.
    Lexical,
    /// Semantic ranking only.
    Semantic,
    /// Both rankings.
    Both,
}

/// One fused result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    /// Operator name.
    pub name: String,
    /// Summed RRF score (higher is better).
    pub score: f32,
    /// Ranking(s) the item came from.
    pub source: HitSource,
}

impl From<FusedHit> for RankedHit {
    fn from(hit: FusedHit) -> Self {
        RankedHit::new(hit.name, hit.score)
    }
}

#[derive(Default)]
struct Accumulator {
    score: f32,
    lexical: bool,
    semantic: bool,
}

/// Fuse two rankings of names.
///
/// Results are sorted by fused score descending, ties broken by name
/// ascending so the output does not depend on hash order. Items whose score
/// does not exceed `params.threshold` are dropped before truncating to
/// `params.limit`. A name repeated within one ranking only counts at its
/// first position.
pub fn reciprocal_rank_fusion<S: AsRef<str>>(
    lexical: &[S],
    semantic: &[S],
    params: &FusionParams,
) -> Vec<FusedHit> {
    let mut scores: HashMap<&str, Accumulator> = HashMap::new();

    for (rank, name) in lexical.iter().enumerate() {
        let entry = scores.entry(name.as_ref()).or_default();
        if entry.lexical {
            continue;
        }
        entry.lexical = true;
        entry.score += params.lexical_weight / (params.k + (rank + 1) as f32);
    }

    for (rank, name) in semantic.iter().enumerate() {
        let entry = scores.entry(name.as_ref()).or_default();
        if entry.semantic {
            continue;
        }
        entry.semantic = true;
        entry.score += params.semantic_weight / (params.k + (rank + 1) as f32);
    }

    let mut results: Vec<FusedHit> = scores
        .into_iter()
        .filter(|(_, acc)| acc.score > params.threshold)
        .map(|(name, acc)| {
            let source = match (acc.lexical, acc.semantic) {
                (true, true) => HitSource::Both,
                (false, true) => HitSource::Semantic,
                _ => HitSource::Lexical,
            };
            FusedHit {
                name: name.to_string(),
                score: acc.score,
                source,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    results.truncate(params.limit);
    results
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(lexical_weight: f32, semantic_weight: f32) -> FusionParams {
        FusionParams {
            lexical_weight,
            semantic_weight,
            ..FusionParams::default()
        }
    }

    fn names(hits: &[FusedHit]) -> Vec<&str> {
        hits.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_score_for_item_in_both_rankings() {
        let results = reciprocal_rank_fusion(&["a", "b"], &["c", "b"], &params(0.7, 0.3));
        let b = results.iter().find(|h| h.name == "b").unwrap();

        let expected = 0.7 / (60.0 + 2.0) + 0.3 / (60.0 + 2.0);
        assert!((b.score - expected).abs() < 1e-7);
        assert_eq!(b.source, HitSource::Both);
    }

    #[test]
    fn test_score_for_item_in_one_ranking() {
        let results = reciprocal_rank_fusion(&["a"], &["c", "d", "e"], &params(0.5, 0.25));

        let a = results.iter().find(|h| h.name == "a").unwrap();
        assert!((a.score - 0.5 / 61.0).abs() < 1e-7);
        assert_eq!(a.source, HitSource::Lexical);

        let e = results.iter().find(|h| h.name == "e").unwrap();
        assert!((e.score - 0.25 / 63.0).abs() < 1e-7);
        assert_eq!(e.source, HitSource::Semantic);
    }

    #[test]
    fn test_shared_item_ranks_first() {
        let results = reciprocal_rank_fusion(
            &["shared", "lex-only"],
            &["shared", "sem-only"],
            &FusionParams::default(),
        );
        assert_eq!(results[0].name, "shared");
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_ties_break_by_name() {
        let results = reciprocal_rank_fusion(&["zeta"], &["alpha"], &params(0.5, 0.5));
        assert_eq!(names(&results), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut p = params(1.0, 0.0);
        p.k = 0.0;
        p.threshold = 0.5;
        // Ranks 1, 2, 3 score 1.0, 0.5, 0.333.
        let results = reciprocal_rank_fusion(&["a", "b", "c"], &[], &p);
        assert_eq!(names(&results), vec!["a"]);
    }

    #[test]
    fn test_zero_weight_ranking_is_dropped_at_zero_threshold() {
        let results = reciprocal_rank_fusion(&["a"], &["b"], &params(1.0, 0.0));
        assert_eq!(names(&results), vec!["a"]);
    }

    #[test]
    fn test_limit_truncates() {
        let p = FusionParams {
            limit: 2,
            ..FusionParams::default()
        };
        let results = reciprocal_rank_fusion(&["a", "b", "c"], &["d", "e"], &p);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_duplicate_within_ranking_counts_once() {
        let results = reciprocal_rank_fusion(&["a", "a"], &[], &params(1.0, 1.0));
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0 / 61.0).abs() < 1e-7);
    }

    #[test]
    fn test_empty_inputs() {
        let empty: [&str; 0] = [];
        assert!(reciprocal_rank_fusion(&empty, &empty, &FusionParams::default()).is_empty());
    }

    #[test]
    fn test_into_ranked_hit() {
        let hit = FusedHit {
            name: "a".into(),
            score: 0.25,
            source: HitSource::Both,
        };
        let ranked: RankedHit = hit.into();
        assert_eq!(ranked.name, "a");
        assert_eq!(ranked.score, 0.25);
    }

    fn ranking() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-f]", 0..6)
    }

    proptest! {
        #[test]
        fn prop_swapping_rankings_and_weights_is_commutative(
            lexical in ranking(),
            semantic in ranking(),
            w1 in 0.0f32..1.0,
            w2 in 0.0f32..1.0,
        ) {
            let forward = reciprocal_rank_fusion(&lexical, &semantic, &params(w1, w2));
            let swapped = reciprocal_rank_fusion(&semantic, &lexical, &params(w2, w1));

            let forward: Vec<(String, f32)> =
                forward.into_iter().map(|h| (h.name, h.score)).collect();
            let swapped: Vec<(String, f32)> =
                swapped.into_iter().map(|h| (h.name, h.score)).collect();
            prop_assert_eq!(forward, swapped);
        }

        #[test]
        fn prop_scores_are_non_increasing(
            lexical in ranking(),
            semantic in ranking(),
        ) {
            let results = reciprocal_rank_fusion(&lexical, &semantic, &FusionParams::default());
            for pair in results.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
