//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the planning operations.
//!
//! Template loading chain:
//! 1. `{prompts.dir}/{name}.pmt` (operator override)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

use std::path::PathBuf;

use thiserror::Error;

mod builder;
pub mod embedded;
mod loader;

pub use builder::PromptBuilder;
pub use loader::{PromptKind, PromptLoader};

/// Errors from loading or rendering prompt templates
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt template not found: {0}")]
    NotFound(String),

    #[error("Failed to read prompt {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid prompt template {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render prompt {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}
