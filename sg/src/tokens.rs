//! Token counting with the cl100k_base encoding used by the GPT-3.5/4 family

use eyre::{Result, eyre};
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// BPE tokenizer wrapper
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Load the cl100k_base encoding
    pub fn new() -> Result<Self> {
        debug!("TokenCounter::new: loading cl100k_base");
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| eyre!("Failed to load cl100k_base tokenizer: {}", e))?;
        Ok(Self { bpe })
    }

    /// Count tokens in a string
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}
