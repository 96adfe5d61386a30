//! Completion provider abstraction.

use async_trait::async_trait;
use opscout_core::Result;

/// A text completion backend.
///
/// The hosting application supplies the concrete model client.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt` and return the model's full text response.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name, for logging.
    fn name(&self) -> &str {
        "completion"
    }
}
