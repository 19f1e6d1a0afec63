//! Optimization service: validate, call the model once, trim

use super::{
    wrap_prompt, OptimizationError, OptimizationRequest, OptimizationResult, MAX_OUTPUT_TOKENS,
    SYSTEM_INSTRUCTION,
};
use crate::api::CompletionProvider;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Stateless front for the model capability.
///
/// Cloning is cheap and clones share the provider; concurrent calls are
/// independent.
#[derive(Clone)]
pub struct OptimizationService {
    provider: Arc<dyn CompletionProvider>,
}

impl OptimizationService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Validate a raw JSON payload and optimize its `prompt` field
    pub async fn optimize_payload(
        &self,
        payload: &Value,
    ) -> Result<OptimizationResult, OptimizationError> {
        let prompt = payload
            .get("prompt")
            .and_then(Value::as_str)
            .ok_or(OptimizationError::Validation)?;

        self.optimize(OptimizationRequest::new(prompt)).await
    }

    pub async fn optimize(
        &self,
        request: OptimizationRequest,
    ) -> Result<OptimizationResult, OptimizationError> {
        if request.prompt.is_empty() {
            return Err(OptimizationError::Validation);
        }

        info!(chars = request.prompt.chars().count(), "Optimizing prompt");

        let text = self
            .provider
            .generate_completion(
                SYSTEM_INSTRUCTION,
                &wrap_prompt(&request.prompt),
                MAX_OUTPUT_TOKENS,
            )
            .await
            .map_err(|e| {
                error!("Error optimizing prompt: {}", e);
                OptimizationError::Upstream
            })?;

        Ok(OptimizationResult {
            optimized_prompt: text.trim().to_string(),
        })
    }
}
