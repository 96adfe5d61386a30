//! Okapi BM25 over the operator catalog.
//!
//! Each record contributes one document: its name followed by its
//! description, tokenized with [`tokenize`](crate::tokenize).
//!
//! # Scoring
//!
//! ```text
//! idf(t)      = ln(1 + (N - n(t) + 0.5) / (n(t) + 0.5))
//! score(d, q) = Σ_{t ∈ q} idf(t) · tf(t, d) · (k1 + 1)
//!                         / (tf(t, d) + k1 · (1 - b + b · |d| / avgdl))
//! ```
//!
//! # Cutoff
//!
//! [`Bm25Index::search`] walks hits in descending score order and stops at
//! `limit` results or at the first score `<= threshold`, whichever comes
//! first. A hit scoring exactly the threshold is excluded.

use std::collections::HashMap;

use log::debug;
use opscout_core::{CatalogSnapshot, RankedHit};
use serde::{Deserialize, Serialize};

use crate::tokenizer::tokenize;

/// BM25 free parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Length normalization strength (0 = none, 1 = full).
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// In-memory BM25 index built from one catalog snapshot.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    names: Vec<String>,
    corpus: Vec<Vec<String>>,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_freqs: HashMap<String, usize>,
    avg_doc_len: f32,
    params: Bm25Params,
    fingerprint: String,
}

impl Bm25Index {
    /// Tokenize and index every record of the snapshot, in catalog order.
    pub fn build(snapshot: &CatalogSnapshot, params: Bm25Params) -> Self {
        let mut names = Vec::with_capacity(snapshot.len());
        let mut corpus = Vec::with_capacity(snapshot.len());
        let mut term_freqs = Vec::with_capacity(snapshot.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for record in snapshot.records() {
            let tokens = tokenize(&format!("{} {}", record.name, record.description));

            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }

            names.push(record.name.clone());
            corpus.push(tokens);
            term_freqs.push(tf);
        }

        let total_len: usize = corpus.iter().map(Vec::len).sum();
        let avg_doc_len = if corpus.is_empty() || total_len == 0 {
            1.0
        } else {
            total_len as f32 / corpus.len() as f32
        };

        debug!(
            "Built BM25 index: {} documents, {} distinct terms",
            names.len(),
            doc_freqs.len()
        );

        Self {
            names,
            corpus,
            term_freqs,
            doc_freqs,
            avg_doc_len,
            params,
            fingerprint: snapshot.fingerprint().to_string(),
        }
    }

    /// Fingerprint of the snapshot this index was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Tokens of the document at `position`, if any.
    pub fn document_tokens(&self, position: usize) -> Option<&[String]> {
        self.corpus.get(position).map(Vec::as_slice)
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
        let total = self.names.len() as f32;
        (1.0 + (total - n + 0.5) / (n + 0.5)).ln()
    }

    /// BM25 score of every document against the query, in catalog order.
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let query_tokens = tokenize(query);
        let Bm25Params { k1, b } = self.params;

        let idfs: Vec<(String, f32)> = query_tokens
            .into_iter()
            .filter(|t| self.doc_freqs.contains_key(t))
            .map(|t| {
                let idf = self.idf(&t);
                (t, idf)
            })
            .collect();

        self.term_freqs
            .iter()
            .zip(&self.corpus)
            .map(|(tf, tokens)| {
                let norm = k1 * (1.0 - b + b * tokens.len() as f32 / self.avg_doc_len);
                idfs.iter()
                    .filter_map(|(term, idf)| {
                        tf.get(term).map(|&f| {
                            let f = f as f32;
                            idf * f * (k1 + 1.0) / (f + norm)
                        })
                    })
                    .sum()
            })
            .collect()
    }

    /// Rank documents for a query.
    ///
    /// Results are ordered by descending score, ties broken by catalog
    /// order. Collection stops at `limit` hits or at the first hit whose
    /// score is `<= threshold`.
    pub fn search(&self, query: &str, limit: usize, threshold: f32) -> Vec<RankedHit> {
        let scores = self.scores(query);

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut hits = Vec::with_capacity(limit.min(order.len()));
        for position in order {
            if hits.len() >= limit {
                break;
            }
            let score = scores[position];
            if score <= threshold {
                break;
            }
            hits.push(RankedHit::new(self.names[position].clone(), score));
        }
        hits
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opscout_core::OperatorRecord;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            OperatorRecord::new("clean_email_mapper", "removes email addresses from text"),
            OperatorRecord::new("clean_html_mapper", "strips HTML tags from text"),
            OperatorRecord::new("image_face_blur_mapper", "blurs detected faces in images"),
        ])
    }

    fn index() -> Bm25Index {
        Bm25Index::build(&snapshot(), Bm25Params::default())
    }

    fn names(hits: &[RankedHit]) -> Vec<&str> {
        hits.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_build_records_fingerprint_and_corpus() {
        let idx = index();
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.fingerprint(), snapshot().fingerprint());
        assert_eq!(
            idx.document_tokens(1).unwrap()[..3],
            ["clean", "html", "mapper"]
        );
    }

    #[test]
    fn test_clean_email_html_ranks_cleaners_first() {
        let hits = index().search("clean email html", 5, 0.0);
        let top: Vec<&str> = names(&hits);
        assert!(top.len() >= 2);
        assert!(top[..2].contains(&"clean_email_mapper"));
        assert!(top[..2].contains(&"clean_html_mapper"));
        assert!(!top.contains(&"image_face_blur_mapper"));
    }

    #[test]
    fn test_no_match_returns_empty() {
        assert!(index().search("reverse word order", 5, 0.1).is_empty());
        assert!(index().search("reverse word order", 5, 0.0).is_empty());
    }

    #[test]
    fn test_scores_non_increasing_and_above_threshold() {
        let threshold = 0.05;
        let hits = index().search("text images faces email", 10, threshold);
        assert!(!hits.is_empty());
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(hits.iter().all(|h| h.score > threshold));
    }

    #[test]
    fn test_threshold_equal_score_is_excluded() {
        let idx = index();
        let hits = idx.search("html", 5, 0.0);
        assert_eq!(names(&hits), vec!["clean_html_mapper"]);

        let exact = hits[0].score;
        assert!(idx.search("html", 5, exact).is_empty());
    }

    #[test]
    fn test_limit_truncates() {
        let hits = index().search("text images", 1, 0.0);
        assert_eq!(hits.len(), 1);
        assert!(index().search("text", 0, 0.0).is_empty());
    }

    #[test]
    fn test_ties_follow_catalog_order() {
        // "text" appears once in each of the first two descriptions, and the
        // two documents have the same length.
        let hits = index().search("text", 5, 0.0);
        assert_eq!(names(&hits), vec!["clean_email_mapper", "clean_html_mapper"]);
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        let idx = index();
        let scores = idx.scores("email");
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0);
        assert!(idx.idf("email") > idx.idf("mapper"));
    }

    #[test]
    fn test_empty_catalog() {
        let idx = Bm25Index::build(&CatalogSnapshot::new(vec![]), Bm25Params::default());
        assert!(idx.is_empty());
        assert!(idx.search("anything", 10, 0.0).is_empty());
    }

    #[test]
    fn test_empty_query() {
        assert!(index().search("", 10, 0.0).is_empty());
    }

    #[test]
    fn test_params_serialization() {
        let json = serde_json::to_string(&Bm25Params::default()).unwrap();
        assert!(json.contains("\"k1\":1.5"));
        assert!(json.contains("\"b\":0.75"));
    }
}
