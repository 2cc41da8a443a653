//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Break a goal into at most eight short sub-problems
pub const DECOMPOSITION: &str = include_str!("../../prompts/decomposition.pmt");

/// Concrete, diverse options for completing one sub-problem
pub const OPTIONS: &str = include_str!("../../prompts/options.pmt");

/// Deduplicate and synthesize the history into a report
pub const SUMMARIZE: &str = include_str!("../../prompts/summarize.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "decomposition" => Some(DECOMPOSITION),
        "options" => Some(OPTIONS),
        "summarize" => Some(SUMMARIZE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
