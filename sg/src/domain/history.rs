//! History domain type
//!
//! Callers send what they have learned so far either as a list (strings or
//! arbitrary JSON entries) or as a `{problem: solutions}` mapping. Both shapes
//! render to one line per entry for prompt substitution.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Placeholder rendered for an empty history
pub const EMPTY_HISTORY: &str = "(none)";

/// One prior result
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// Free-form text
    Text(String),
    /// A sub-problem and the solutions found for it
    Solved { problem: String, solutions: Value },
    /// Any other JSON value
    Structured(Value),
}

impl HistoryEntry {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Solved { problem, solutions } => format!("{}: {}", problem, render_value(solutions)),
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<Value> for HistoryEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Ordered record of prior results
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawHistory")]
pub struct History {
    entries: Vec<HistoryEntry>,
}

/// Accepted wire shapes for `history`
///
/// Mapping keys keep the caller's order (serde_json `preserve_order`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawHistory {
    Entries(Vec<Value>),
    Mapping(Map<String, Value>),
    Missing,
}

impl From<RawHistory> for History {
    fn from(raw: RawHistory) -> Self {
        let entries = match raw {
            RawHistory::Entries(values) => values.into_iter().map(HistoryEntry::from).collect(),
            RawHistory::Mapping(map) => map
                .into_iter()
                .map(|(problem, solutions)| HistoryEntry::Solved { problem, solutions })
                .collect(),
            RawHistory::Missing => Vec::new(),
        };
        Self { entries }
    }
}

impl History {
    /// History of plain text entries
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: texts.into_iter().map(|t| HistoryEntry::Text(t.into())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render for prompt substitution, one entry per line
    pub fn render(&self) -> String {
        debug!(entry_count = self.entries.len(), "History::render: called");
        if self.entries.is_empty() {
            return EMPTY_HISTORY.to_string();
        }
        self.entries.iter().map(HistoryEntry::render).collect::<Vec<_>>().join("\n")
    }
}
