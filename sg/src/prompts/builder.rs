//! Prompt Builder
//!
//! Renders the planning prompts from registered Handlebars templates.
//! Rendering is a pure function of its inputs.

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::{PromptError, PromptKind, PromptLoader};
use crate::domain::GoalContext;

/// Values substituted into a template
#[derive(Debug, Serialize)]
struct PromptData<'a> {
    primary_goal: &'a str,
    personalization: &'a str,
    history: String,
    task: Option<&'a str>,
}

impl<'a> PromptData<'a> {
    fn from_goal(ctx: &'a GoalContext) -> Self {
        Self {
            primary_goal: &ctx.primary_goal,
            personalization: &ctx.personalization,
            history: ctx.history.render(),
            task: None,
        }
    }
}

/// Renders planning prompts
pub struct PromptBuilder {
    hbs: Handlebars<'static>,
}

impl PromptBuilder {
    /// Register every template the loader provides
    ///
    /// Template syntax errors surface here, once, rather than per request.
    pub fn new(loader: &PromptLoader) -> Result<Self, PromptError> {
        debug!(?loader, "PromptBuilder::new: called");
        let mut hbs = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle quotes and ampersands
        hbs.register_escape_fn(handlebars::no_escape);

        for kind in PromptKind::ALL {
            let name = kind.template_name();
            let source = loader.load_template(kind)?;
            hbs.register_template_string(name, source.trim_end())
                .map_err(|e| PromptError::Template {
                    name: name.to_string(),
                    source: Box::new(e),
                })?;
        }

        Ok(Self { hbs })
    }

    /// Builder backed by the embedded templates only
    pub fn embedded() -> Result<Self, PromptError> {
        Self::new(&PromptLoader::embedded_only())
    }

    /// Prompt asking for up to eight sub-problems of the primary goal
    pub fn decomposition(&self, ctx: &GoalContext) -> Result<String, PromptError> {
        self.render(PromptKind::Decomposition, &PromptData::from_goal(ctx))
    }

    /// Prompt asking for concrete options to complete `task`
    pub fn options(&self, ctx: &GoalContext, task: &str) -> Result<String, PromptError> {
        let data = PromptData {
            task: Some(task),
            ..PromptData::from_goal(ctx)
        };
        self.render(PromptKind::Options, &data)
    }

    /// Prompt asking for a deduplicated final report over the history
    pub fn summarize(&self, ctx: &GoalContext) -> Result<String, PromptError> {
        self.render(PromptKind::Summarize, &PromptData::from_goal(ctx))
    }

    fn render(&self, kind: PromptKind, data: &PromptData<'_>) -> Result<String, PromptError> {
        debug!(%kind, primary_goal = %data.primary_goal, "PromptBuilder::render: called");
        self.hbs
            .render(kind.template_name(), data)
            .map_err(|e| PromptError::Render {
                name: kind.template_name().to_string(),
                source: Box::new(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::History;

    fn spanish() -> GoalContext {
        GoalContext::new("learn Spanish")
            .with_personalization("visual learner")
            .with_history(History::from_texts(["bought a textbook", "installed a flashcard app"]))
    }

    #[test]
    fn test_decomposition_substitutes_inputs() {
        let builder = PromptBuilder::embedded().unwrap();
        let prompt = builder.decomposition(&spanish()).unwrap();

        assert!(prompt.starts_with("I want to accomplish the main goal of learn Spanish\n"));
        assert!(prompt.contains("Personalization Cue: visual learner"));
        assert!(prompt.contains("bought a textbook\ninstalled a flashcard app"));
        assert!(prompt.contains("at most 8 sub-problems"));
        assert!(prompt.ends_with("Output:"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_options_includes_task() {
        let builder = PromptBuilder::embedded().unwrap();
        let prompt = builder.options(&spanish(), "Practice vocabulary").unwrap();

        assert!(prompt.contains("Primary-query: learn Spanish"));
        assert!(prompt.contains("Sub-query: Practice vocabulary"));
        assert!(prompt.contains("Personalization Cue: visual learner"));
    }

    #[test]
    fn test_summarize_renders_mapping_history() {
        let builder = PromptBuilder::embedded().unwrap();
        let history: History = serde_json::from_value(serde_json::json!({
            "Practice vocabulary": ["Anki decks", "Label objects at home"]
        }))
        .unwrap();
        let ctx = GoalContext::new("learn Spanish").with_history(history);

        let prompt = builder.summarize(&ctx).unwrap();
        assert!(prompt.contains("Primary-query: learn Spanish"));
        assert!(prompt.contains("Practice vocabulary: [\"Anki decks\",\"Label objects at home\"]"));
    }

    #[test]
    fn test_empty_inputs_render_placeholders() {
        let builder = PromptBuilder::embedded().unwrap();
        let prompt = builder.decomposition(&GoalContext::new("run a marathon")).unwrap();

        assert!(prompt.contains("Personalization Cue: \n"));
        assert!(prompt.contains("My Context:\n(none)"));
        assert!(!prompt.contains("None"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let builder = PromptBuilder::embedded().unwrap();
        let ctx = spanish();

        assert_eq!(builder.decomposition(&ctx).unwrap(), builder.decomposition(&ctx).unwrap());
        assert_eq!(
            builder.options(&ctx, "Watch shows").unwrap(),
            builder.options(&ctx, "Watch shows").unwrap()
        );
        assert_eq!(builder.summarize(&ctx).unwrap(), builder.summarize(&ctx).unwrap());
    }

    #[test]
    fn test_no_html_escaping() {
        let builder = PromptBuilder::embedded().unwrap();
        let ctx = GoalContext::new("compare <b>R&D</b> \"budgets\"");

        let prompt = builder.decomposition(&ctx).unwrap();
        assert!(prompt.contains("compare <b>R&D</b> \"budgets\""));
    }

    #[test]
    fn test_override_template_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("decomposition.pmt"), "Goal={{primary_goal}}\n").unwrap();

        let builder = PromptBuilder::new(&PromptLoader::new(dir.path())).unwrap();
        assert_eq!(builder.decomposition(&spanish()).unwrap(), "Goal=learn Spanish");
    }

    #[test]
    fn test_broken_override_fails_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("options.pmt"), "{{#if task}}unclosed").unwrap();

        let err = PromptBuilder::new(&PromptLoader::new(dir.path())).err().unwrap();
        assert!(matches!(err, PromptError::Template { ref name, .. } if name == "options"));
    }
}
