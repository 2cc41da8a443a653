//! Completion client
//!
//! Wraps any [`LlmClient`] backend with the request policy shared by every
//! planning operation: prompts are cut to a fixed character budget, the
//! sampling temperature defaults to 0.3, and transient failures are retried
//! with a fixed delay between attempts.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::tokens::TokenCounter;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Prompts longer than this many characters are cut before sending
pub const MAX_PROMPT_CHARS: usize = 3700;

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_attempts: u32,

    /// Wait between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Cut `prompt` to at most `max_chars` characters, never splitting a character
pub fn truncate_prompt(prompt: &str, max_chars: usize) -> &str {
    match prompt.char_indices().nth(max_chars) {
        Some((idx, _)) => &prompt[..idx],
        None => prompt,
    }
}

/// Completion client shared by all planning operations
pub struct CompletionClient {
    llm: Arc<dyn LlmClient>,
    retry: RetryPolicy,
    max_prompt_chars: usize,
    tokens: Option<TokenCounter>,
}

impl CompletionClient {
    /// Create a client with the default retry policy and prompt budget
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        debug!(provider = llm.provider(), "CompletionClient::new: called");
        Self {
            llm,
            retry: RetryPolicy::default(),
            max_prompt_chars: MAX_PROMPT_CHARS,
            tokens: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    /// Attach a tokenizer so prompt sizes are logged in tokens
    pub fn with_token_counter(mut self, tokens: TokenCounter) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send `prompt` to `model` and return the completion text
    ///
    /// Retryable errors are retried up to the policy's attempt budget with a
    /// fixed delay between attempts; the last error is returned once the
    /// budget is spent. Non-retryable errors return immediately.
    pub async fn complete(&self, prompt: &str, model: &str, temperature: f32) -> Result<String, LlmError> {
        let sent = truncate_prompt(prompt, self.max_prompt_chars);
        if sent.len() < prompt.len() {
            debug!(
                original_len = prompt.len(),
                sent_len = sent.len(),
                max_chars = self.max_prompt_chars,
                "complete: prompt truncated"
            );
        }
        if let Some(tokens) = &self.tokens {
            debug!(prompt_tokens = tokens.count(sent), "complete: prompt size");
        }

        let request = CompletionRequest::new(sent, model, temperature);
        let attempts = self.retry.attempts();

        let mut attempt = 1;
        loop {
            match self.llm.complete(request.clone()).await {
                Ok(response) => {
                    info!(
                        provider = self.llm.provider(),
                        %model,
                        attempt,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        total_tokens = response.usage.total(),
                        "completion succeeded"
                    );
                    return Ok(response.into_text());
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        delay_ms = self.retry.delay.as_millis() as u64,
                        retry_after = ?e.retry_after(),
                        error = %e,
                        "complete: retrying after transient error"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "complete: giving up");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use tokio::time::Instant;

    fn client_with(mock: &Arc<MockLlmClient>) -> CompletionClient {
        CompletionClient::new(mock.clone() as Arc<dyn LlmClient>)
    }

    #[test]
    fn test_truncate_prompt_exact_prefix() {
        let prompt = "x".repeat(5000);
        let cut = truncate_prompt(&prompt, 3700);
        assert_eq!(cut.chars().count(), 3700);
        assert_eq!(cut, &prompt[..3700]);
    }

    #[test]
    fn test_truncate_prompt_short_untouched() {
        assert_eq!(truncate_prompt("short", 3700), "short");
        assert_eq!(truncate_prompt("", 3700), "");
    }

    #[test]
    fn test_truncate_prompt_counts_characters_not_bytes() {
        let prompt = "é".repeat(10);
        let cut = truncate_prompt(&prompt, 4);
        assert_eq!(cut, "éééé");
        assert_eq!(cut.len(), 8);
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay, Duration::from_secs(15));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts(), 1);
    }

    #[tokio::test]
    async fn test_long_prompt_is_truncated_before_sending() {
        let mock = Arc::new(MockLlmClient::answering("ok"));
        let client = client_with(&mock);
        let prompt: String = ('a'..='z').cycle().take(5000).collect();

        client.complete(&prompt, "gpt-test", DEFAULT_TEMPERATURE).await.unwrap();

        let sent = mock.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].prompt.chars().count(), 3700);
        assert_eq!(sent[0].prompt, prompt.chars().take(3700).collect::<String>());
        assert_eq!(sent[0].model, "gpt-test");
        assert!((sent[0].temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_custom_prompt_budget() {
        let mock = Arc::new(MockLlmClient::answering("ok"));
        let client = client_with(&mock).with_max_prompt_chars(10);

        client.complete("0123456789abcdef", "m", 0.3).await.unwrap();
        assert_eq!(mock.requests()[0].prompt, "0123456789");
    }

    #[tokio::test]
    async fn test_success_does_not_retry() {
        let mock = Arc::new(MockLlmClient::answering("1. Alpha"));
        let client = client_with(&mock);

        let text = client.complete("prompt", "m", 0.3).await.unwrap();
        assert_eq!(text, "1. Alpha");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_completion_is_success() {
        let mock = Arc::new(MockLlmClient::answering(""));
        let client = client_with(&mock);

        assert_eq!(client.complete("prompt", "m", 0.3).await.unwrap(), "");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_then_success_waits_three_delays() {
        let mock = Arc::new(MockLlmClient::flaky(3, "recovered"));
        let client = client_with(&mock);

        let start = Instant::now();
        let text = client.complete("prompt", "m", 0.3).await.unwrap();

        assert_eq!(text, "recovered");
        assert_eq!(mock.call_count(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_failures_propagate_after_fourth_attempt() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::Status(503); 4]));
        let client = client_with(&mock);

        let start = Instant::now();
        let err = client.complete("prompt", "m", 0.3).await.unwrap_err();

        assert!(matches!(err, LlmError::ApiError { status: 503, .. }));
        assert_eq!(mock.call_count(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_immediately() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::Status(401), MockReply::Text("never".into())]));
        let client = client_with(&mock).with_retry(RetryPolicy::new(4, Duration::ZERO));

        let err = client.complete("prompt", "m", 0.3).await.unwrap_err();
        assert!(matches!(err, LlmError::ApiError { status: 401, .. }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_policy_limits_attempts() {
        let mock = Arc::new(MockLlmClient::flaky(2, "late"));
        let client = client_with(&mock).with_retry(RetryPolicy::new(2, Duration::ZERO));

        assert!(client.complete("prompt", "m", 0.3).await.is_err());
        assert_eq!(mock.call_count(), 2);
        assert_eq!(client.retry_policy().max_attempts, 2);
    }

    #[tokio::test]
    async fn test_no_retry_policy() {
        let mock = Arc::new(MockLlmClient::flaky(1, "late"));
        let client = client_with(&mock).with_retry(RetryPolicy::none());

        assert!(client.complete("prompt", "m", 0.3).await.is_err());
        assert_eq!(mock.call_count(), 1);
    }
}
