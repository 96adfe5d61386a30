//! Mock completion provider for testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use opscout_core::{Error, Result};
use tokio::sync::Mutex;

use super::provider::CompletionProvider;

/// Completion provider that returns canned responses.
///
/// Responses are returned in order, cycling back to the first once all have
/// been used.
#[derive(Clone)]
pub struct MockCompletionProvider {
    responses: Arc<Mutex<MockResponses>>,
    calls: Arc<AtomicUsize>,
}

struct MockResponses {
    canned: Vec<String>,
    index: usize,
}

impl MockCompletionProvider {
    /// Create a mock with canned responses.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses {
                canned: responses,
                index: 0,
            })),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock with a single response.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        if responses.canned.is_empty() {
            return Err(Error::completion("mock provider has no responses"));
        }

        let content = responses.canned[responses.index].clone();
        responses.index = (responses.index + 1) % responses.canned.len();
        Ok(content)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let provider = MockCompletionProvider::new(vec!["First".into(), "Second".into()]);

        assert_eq!(provider.complete("x").await.unwrap(), "First");
        assert_eq!(provider.complete("x").await.unwrap(), "Second");
        assert_eq!(provider.complete("x").await.unwrap(), "First");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_without_responses_errors() {
        let provider = MockCompletionProvider::new(Vec::new());
        let err = provider.complete("x").await.unwrap_err();
        assert!(matches!(err, Error::Completion(_)));
    }
}
