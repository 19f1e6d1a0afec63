//! Prompt optimization via a hosted model

mod instructions;
pub(crate) mod service;

pub use instructions::{wrap_prompt, SYSTEM_INSTRUCTION};
pub use service::OptimizationService;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output ceiling handed to the model for every optimization
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// A prompt submitted for compression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub prompt: String,
}

impl OptimizationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// The compressed prompt, trimmed of surrounding whitespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_prompt: String,
}

/// Failure categories of an optimization.
///
/// Display strings are the exact messages returned to callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationError {
    /// Missing, non-text or empty prompt
    #[error("Invalid prompt provided")]
    Validation,

    /// The model capability failed
    #[error("Failed to optimize prompt")]
    Upstream,
}

impl OptimizationError {
    /// Whether the caller can fix this by changing the request
    pub fn is_caller_error(&self) -> bool {
        matches!(self, OptimizationError::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_uses_camel_case_on_the_wire() {
        let result = OptimizationResult {
            optimized_prompt: "reduce prompt ~8x".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "optimizedPrompt": "reduce prompt ~8x" })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(OptimizationError::Validation.to_string(), "Invalid prompt provided");
        assert_eq!(OptimizationError::Upstream.to_string(), "Failed to optimize prompt");
        assert!(OptimizationError::Validation.is_caller_error());
        assert!(!OptimizationError::Upstream.is_caller_error());
    }
}
