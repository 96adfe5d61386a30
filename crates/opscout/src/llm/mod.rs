//! LLM-driven retrieval.
//!
//! A completion model is shown the whole catalog and asked to pick the most
//! relevant operators. Answers are validated against the catalog and cached
//! by query in a [`QueryCache`](crate::QueryCache).

mod mock;
mod prompt;
mod provider;
mod retriever;

pub use mock::MockCompletionProvider;
pub use prompt::{build_prompt, parse_response};
pub use provider::CompletionProvider;
pub use retriever::LlmRetriever;
