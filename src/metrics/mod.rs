//! Size-reduction metrics for optimized prompts

use serde::Serialize;
use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

static TOKENIZER: OnceLock<Option<CoreBPE>> = OnceLock::new();

/// Percentage of characters removed, rounded to one decimal place.
///
/// `None` when there is no input length to compare against or no output yet.
/// Counts characters, not tokens; the result is negative when the output grew.
pub fn reduction_percentage(input_chars: usize, output_chars: usize) -> Option<f64> {
    if input_chars == 0 || output_chars == 0 {
        return None;
    }

    let ratio = (input_chars as f64 - output_chars as f64) / input_chars as f64;
    Some((ratio * 1000.0).round() / 10.0)
}

/// Approximate token count using the cl100k_base encoding.
///
/// Falls back to ~4 characters per token if the encoder cannot be loaded.
pub fn estimate_tokens(text: &str) -> usize {
    match TOKENIZER.get_or_init(|| tiktoken_rs::cl100k_base().ok()) {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => text.len() / 4,
    }
}

/// Before/after comparison for one optimization
#[derive(Debug, Clone, Serialize)]
pub struct ReductionReport {
    pub original_chars: usize,
    pub optimized_chars: usize,
    pub reduction_percent: Option<f64>,
    pub original_tokens: usize,
    pub optimized_tokens: usize,
}

impl ReductionReport {
    pub fn new(original: &str, optimized: &str) -> Self {
        let original_chars = original.chars().count();
        let optimized_chars = optimized.chars().count();

        Self {
            original_chars,
            optimized_chars,
            reduction_percent: reduction_percentage(original_chars, optimized_chars),
            original_tokens: estimate_tokens(original),
            optimized_tokens: estimate_tokens(optimized),
        }
    }

    pub fn tokens_saved(&self) -> usize {
        self.original_tokens.saturating_sub(self.optimized_tokens)
    }
}

impl std::fmt::Display for ReductionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Reduction ===")?;
        writeln!(f, "Characters: {} -> {}", self.original_chars, self.optimized_chars)?;
        if let Some(percent) = self.reduction_percent {
            writeln!(f, "Reduction: {:.1}%", percent)?;
        }
        writeln!(
            f,
            "Estimated tokens: ~{} -> ~{} (saved ~{})",
            self.original_tokens,
            self.optimized_tokens,
            self.tokens_saved()
        )?;
        Ok(())
    }
}
