//! Domain types for subgoal
//!
//! Request-scoped values flowing through the planning pipeline. Nothing here
//! is persisted or mutated after construction.

mod goal;
mod history;

pub use goal::GoalContext;
pub use history::{History, HistoryEntry};
