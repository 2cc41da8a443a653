//! Planner - the three planning operations over a shared completion client

use thiserror::Error;
use tracing::{debug, info};

use crate::completion::{CompletionClient, DEFAULT_TEMPERATURE};
use crate::domain::GoalContext;
use crate::llm::LlmError;
use crate::parse::{ListParser, parse_list};
use crate::prompts::{PromptBuilder, PromptError};

/// Errors from a planning operation
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] PromptError),

    #[error("Completion failed: {0}")]
    Upstream(#[from] LlmError),
}

/// Runs planning operations
///
/// Immutable once built, so one instance is shared by every request.
pub struct Planner {
    completion: CompletionClient,
    prompts: PromptBuilder,
    model: String,
    temperature: f32,
    parser: ListParser,
}

impl Planner {
    pub fn new(completion: CompletionClient, prompts: PromptBuilder, model: impl Into<String>) -> Self {
        let model = model.into();
        debug!(%model, "Planner::new: called");
        Self {
            completion,
            prompts,
            model,
            temperature: DEFAULT_TEMPERATURE,
            parser: parse_list,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Swap the strategy used to split list output
    pub fn with_parser(mut self, parser: ListParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Break the primary goal into sub-problems
    pub async fn decomposition(&self, ctx: &GoalContext) -> Result<Vec<String>, PlanningError> {
        info!(primary_goal = %ctx.primary_goal, history_len = ctx.history.len(), "decomposition: called");
        let prompt = self.prompts.decomposition(ctx)?;
        let raw = self.complete(&prompt).await?;
        let items = (self.parser)(&raw);
        debug!(item_count = items.len(), "decomposition: parsed");
        Ok(items)
    }

    /// Offer options for completing one sub-problem
    pub async fn options(&self, ctx: &GoalContext, task: &str) -> Result<Vec<String>, PlanningError> {
        info!(primary_goal = %ctx.primary_goal, %task, "options: called");
        let prompt = self.prompts.options(ctx, task)?;
        let raw = self.complete(&prompt).await?;
        let items = (self.parser)(&raw);
        debug!(item_count = items.len(), "options: parsed");
        Ok(items)
    }

    /// Synthesize the history into a final report, returned as-is
    pub async fn summarize(&self, ctx: &GoalContext) -> Result<String, PlanningError> {
        info!(primary_goal = %ctx.primary_goal, history_len = ctx.history.len(), "summarize: called");
        let prompt = self.prompts.summarize(ctx)?;
        Ok(self.complete(&prompt).await?)
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.completion.complete(prompt, &self.model, self.temperature).await
    }
}
