//! Regex pattern matching over the catalog.
//!
//! Matches are returned in catalog order; this strategy does not rank.

use opscout_core::{CatalogSnapshot, Error, Result};
use regex::Regex;

/// Matches a regex against each record's `"{name} {description}"` text.
#[derive(Debug, Clone, Copy)]
pub struct PatternMatcher {
    max_pattern_length: usize,
}

impl PatternMatcher {
    /// Create a matcher accepting patterns up to `max_pattern_length` characters.
    pub fn new(max_pattern_length: usize) -> Self {
        Self { max_pattern_length }
    }

    /// Longest accepted pattern, in characters.
    pub fn max_pattern_length(&self) -> usize {
        self.max_pattern_length
    }

    /// Return up to `limit` names whose search text matches `pattern`.
    ///
    /// A pattern longer than the maximum is rejected with
    /// [`Error::PatternTooLong`]. Invalid regex syntax is logged and yields
    /// no matches.
    pub fn search(
        &self,
        snapshot: &CatalogSnapshot,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let length = pattern.chars().count();
        if length > self.max_pattern_length {
            return Err(Error::PatternTooLong {
                length,
                max: self.max_pattern_length,
            });
        }

        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("Invalid regex pattern '{pattern}': {e}");
                return Ok(Vec::new());
            }
        };

        Ok(snapshot
            .records()
            .iter()
            .filter(|record| regex.is_match(&record.search_text()))
            .take(limit)
            .map(|record| record.name.clone())
            .collect())
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opscout_core::OperatorRecord;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            OperatorRecord::new("clean_email_mapper", "removes email addresses from text"),
            OperatorRecord::new("clean_html_mapper", "strips HTML tags from text"),
            OperatorRecord::new("image_face_blur_mapper", "blurs detected faces in images"),
        ])
    }

    #[test]
    fn test_case_insensitive_match() {
        let hits = PatternMatcher::default()
            .search(&catalog(), "(?i)html", 10)
            .unwrap();
        assert_eq!(hits, vec!["clean_html_mapper"]);
    }

    #[test]
    fn test_matches_preserve_catalog_order() {
        let hits = PatternMatcher::default()
            .search(&catalog(), "mapper", 10)
            .unwrap();
        assert_eq!(
            hits,
            vec!["clean_email_mapper", "clean_html_mapper", "image_face_blur_mapper"]
        );
    }

    #[test]
    fn test_limit_truncates_in_order() {
        let hits = PatternMatcher::default()
            .search(&catalog(), "_mapper", 2)
            .unwrap();
        assert_eq!(hits, vec!["clean_email_mapper", "clean_html_mapper"]);
    }

    #[test]
    fn test_description_is_searched() {
        let hits = PatternMatcher::default()
            .search(&catalog(), "faces", 10)
            .unwrap();
        assert_eq!(hits, vec!["image_face_blur_mapper"]);
    }

    #[test]
    fn test_invalid_regex_returns_empty() {
        let hits = PatternMatcher::default().search(&catalog(), "([a-z", 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_pattern_too_long() {
        let matcher = PatternMatcher::new(4);
        let err = matcher.search(&catalog(), "abcde", 10).unwrap_err();
        assert!(matches!(err, Error::PatternTooLong { length: 5, max: 4 }));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_pattern_at_limit_is_accepted() {
        let matcher = PatternMatcher::new(4);
        let hits = matcher.search(&catalog(), "blur", 10).unwrap();
        assert_eq!(hits, vec!["image_face_blur_mapper"]);
    }

    #[test]
    fn test_length_counts_characters() {
        let matcher = PatternMatcher::new(3);
        assert!(matcher.search(&catalog(), "ééé", 10).is_ok());
    }
}
