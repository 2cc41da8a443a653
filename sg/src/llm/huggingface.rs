//! Hugging Face Inference API client
//!
//! Text-generation backend for chat-tuned Llama-style models. The prompt is
//! wrapped in the `[INST]` instruction format before it is sent.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use crate::config::HuggingFaceConfig;

/// Wrap plain text in the Llama-2 chat instruction format
pub fn instruction_prompt(text: &str) -> String {
    format!("<s>[INST]{text}[/INST]")
}

/// Hugging Face Inference API client
pub struct HuggingFaceClient {
    token: String,
    base_url: String,
    max_new_tokens: u32,
    http: Client,
    timeout: Duration,
}

impl HuggingFaceClient {
    /// Create a new client from the `huggingface` config section and the loaded token
    pub fn from_config(config: &HuggingFaceConfig, token: &str, timeout: Duration) -> Result<Self, LlmError> {
        debug!(base_url = %config.base_url, max_new_tokens = config.max_new_tokens, "from_config: called");
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            token: token.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_new_tokens: config.max_new_tokens,
            http,
            timeout,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(model = %request.model, "build_request_body: called");
        serde_json::json!({
            "inputs": instruction_prompt(&request.prompt),
            "parameters": {
                "max_new_tokens": self.max_new_tokens,
                "temperature": request.temperature,
                "return_full_text": false,
            },
        })
    }
}

#[async_trait]
impl LlmClient for HuggingFaceClient {
    fn provider(&self) -> &'static str {
        "huggingface"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %request.model, prompt_len = request.prompt.len(), "complete: called");
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, self.timeout))?;

        if !response.status().is_success() {
            // 503 here usually means the model is still loading
            let err = LlmError::from_response(response).await;
            debug!(error = %err, "complete: provider error");
            return Err(err);
        }

        let generated: GenerationOutput = response
            .json()
            .await
            .map_err(|e| LlmError::from_body(e, self.timeout))?;

        generated.into_response()
    }
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

/// The Inference API answers with either a list or a single object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationOutput {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl GenerationOutput {
    fn into_response(self) -> Result<CompletionResponse, LlmError> {
        let generation = match self {
            GenerationOutput::Batch(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::InvalidResponse("empty generation list".to_string()))?,
            GenerationOutput::Single(item) => item,
        };
        Ok(CompletionResponse::text(generation.generated_text))
    }
}
