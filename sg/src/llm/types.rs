//! LLM request/response types for subgoal
//!
//! Every call is a single user prompt with no conversation state, so the
//! request carries the prompt text directly rather than a message list.

use tracing::debug;

/// OpenAI chat model used by all three planning operations
pub const GPT3: &str = "gpt-3.5-turbo-1106";

/// Larger OpenAI chat model
pub const GPT4: &str = "gpt-4-1106-preview";

/// Default model for the Hugging Face inference backend
pub const LLAMA2_CHAT: &str = "meta-llama/Llama-2-7b-chat-hf";

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fully rendered (and already truncated) prompt text
    pub prompt: String,

    /// Provider model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        let prompt = prompt.into();
        let model = model.into();
        debug!(%model, prompt_len = prompt.len(), %temperature, "CompletionRequest::new: called");
        Self {
            prompt,
            model,
            temperature,
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Token usage as reported by the provider
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Build a response carrying only text
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: TokenUsage::default(),
        }
    }

    /// The completion text, with a missing body treated as empty
    pub fn into_text(self) -> String {
        debug!(has_content = self.content.is_some(), "CompletionResponse::into_text: called");
        self.content.unwrap_or_default()
    }
}

/// Token usage reported by the provider
///
/// Backends that do not report usage leave both counts at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
