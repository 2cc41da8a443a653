//! GoalContext domain type

use tracing::debug;

use super::History;

/// What the user is trying to accomplish, plus what they have done so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalContext {
    /// The main goal being decomposed
    pub primary_goal: String,
    /// Free-form cues for tailoring the output
    pub personalization: String,
    /// Prior results
    pub history: History,
}

impl GoalContext {
    pub fn new(primary_goal: impl Into<String>) -> Self {
        let primary_goal = primary_goal.into();
        debug!(%primary_goal, "GoalContext::new: called");
        Self {
            primary_goal,
            personalization: String::new(),
            history: History::default(),
        }
    }

    pub fn with_personalization(mut self, personalization: impl Into<String>) -> Self {
        self.personalization = personalization.into();
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }
}
