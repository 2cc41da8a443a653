//! LLM Client module for subgoal
//!
//! Provider backends behind a single [`LlmClient`] trait.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

pub mod client;
mod error;
mod huggingface;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use huggingface::{HuggingFaceClient, instruction_prompt};
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, GPT3, GPT4, LLAMA2_CHAT, TokenUsage};

use crate::config::{Config, Secrets};

/// Create an LLM client based on the provider specified in config
///
/// Supports "openai" and "huggingface" providers.
pub fn create_client(config: &Config, secrets: &Secrets) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.llm.provider, model = %config.active_model(), "create_client: called");
    let timeout = Duration::from_millis(config.llm.timeout_ms);
    match config.llm.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(
                &config.openai,
                &secrets.openai_key,
                timeout,
            )?))
        }
        "huggingface" => {
            debug!("create_client: creating Hugging Face client");
            Ok(Arc::new(HuggingFaceClient::from_config(
                &config.huggingface,
                &secrets.hf_token,
                timeout,
            )?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: openai, huggingface",
                other
            )))
        }
    }
}
