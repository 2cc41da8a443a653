//! Planning operations
//!
//! Decomposition, options and summarize: each renders a prompt, sends it
//! through the completion client and (for the list operations) parses the
//! numbered output.

mod planner;

pub use planner::{Planner, PlanningError};
