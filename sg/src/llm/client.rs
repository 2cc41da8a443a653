//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Implementations perform exactly one provider round-trip per call.
/// Retrying, truncation and temperature defaults belong to
/// [`crate::completion::CompletionClient`], which wraps any backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short provider name for logs
    fn provider(&self) -> &'static str;

    /// Send a single completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
