//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to the
//! embedded defaults.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{PromptError, embedded};

/// Which prompt a planning operation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Decomposition,
    Options,
    Summarize,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [PromptKind::Decomposition, PromptKind::Options, PromptKind::Summarize];

    /// Get the template name for this prompt
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Decomposition => "decomposition",
            Self::Options => "options",
            Self::Summarize => "summarize",
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.template_name())
    }
}

/// Locates template sources
#[derive(Debug, Clone, Default)]
pub struct PromptLoader {
    /// Override directory (e.g., `/etc/subgoal/prompts/`)
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `dir` before the embedded templates
    ///
    /// A directory that does not exist is ignored.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let exists = dir.is_dir();
        debug!(?dir, %exists, "PromptLoader::new: called");

        Self {
            override_dir: if exists { Some(dir.to_path_buf()) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self { override_dir: None }
    }

    /// Build from an optional configured directory
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::new(dir),
            None => Self::embedded_only(),
        }
    }

    /// Load a template by kind
    ///
    /// Checks in order:
    /// 1. Override: `<dir>/{name}.pmt`
    /// 2. Embedded fallback
    pub fn load_template(&self, kind: PromptKind) -> Result<String, PromptError> {
        let name = kind.template_name();
        debug!(%name, "PromptLoader::load_template: called");

        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                info!("Using prompt override {}", path.display());
                return std::fs::read_to_string(&path).map_err(|source| PromptError::Read { path, source });
            }
            debug!(?path, "PromptLoader::load_template: no override");
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| PromptError::NotFound(name.to_string()))
    }
}
