//! subgoal - goal decomposition service
//!
//! Turns a goal, some personalization cues and a history of prior results
//! into LLM prompts, and parses what comes back.
//!
//! # Modules
//!
//! - [`prompts`] - Handlebars prompt templates and the prompt builder
//! - [`completion`] - Truncation and fixed-delay retry around any backend
//! - [`llm`] - Backend trait with OpenAI and Hugging Face implementations
//! - [`parse`] - Numbered-list parsing of completion output
//! - [`planning`] - The decomposition, options and summarize operations
//! - [`server`] - axum HTTP routes
//! - [`config`] - Configuration types, loading and secrets
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod completion;
pub mod config;
pub mod domain;
pub mod llm;
pub mod parse;
pub mod planning;
pub mod prompts;
pub mod server;
pub mod tokens;

// Re-export commonly used types
pub use completion::{CompletionClient, RetryPolicy, truncate_prompt};
pub use config::{Config, Secrets};
pub use domain::{GoalContext, History, HistoryEntry};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use parse::{ListParser, parse_list};
pub use planning::{Planner, PlanningError};
pub use prompts::{PromptBuilder, PromptError, PromptLoader};
pub use server::build_router;
pub use tokens::TokenCounter;
