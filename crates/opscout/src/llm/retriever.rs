//! Query-cached LLM retrieval.

use std::sync::Arc;

use opscout_core::{CatalogSnapshot, Result};

use super::prompt::{build_prompt, parse_response};
use super::provider::CompletionProvider;
use crate::query_cache::QueryCache;

/// Asks a completion model to pick operators, caching answers by query.
pub struct LlmRetriever {
    completion: Arc<dyn CompletionProvider>,
    cache: Option<QueryCache>,
}

impl LlmRetriever {
    /// Create a retriever without a result cache.
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self {
            completion,
            cache: None,
        }
    }

    /// Read and write results through `cache`.
    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Up to `limit` operator names the model considers relevant to `query`.
    ///
    /// A cached answer for the same query and limit is returned without
    /// calling the model. Completion and parse errors propagate; nothing is
    /// cached for a failed call.
    pub async fn retrieve(
        &self,
        snapshot: &CatalogSnapshot,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        if let Some(names) = self.cache.as_ref().and_then(|c| c.get(query, limit)) {
            return Ok(names);
        }

        let prompt = build_prompt(snapshot, query, limit);
        log::debug!(
            "Requesting {limit} operators from '{}' ({} catalog entries)",
            self.completion.name(),
            snapshot.len()
        );
        let response = self.completion.complete(&prompt).await?;
        let names = parse_response(&response, snapshot, limit)?;

        if let Some(cache) = &self.cache {
            cache.put(query, limit, &names);
        }
        Ok(names)
    }
}
