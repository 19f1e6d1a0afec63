//! Backends the controller sends prompts to

use crate::optimization::{
    OptimizationError, OptimizationRequest, OptimizationResult, OptimizationService,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Service(#[from] OptimizationError),
}

/// Something that turns a prompt into an optimized prompt
#[async_trait]
pub trait OptimizerBackend: Send + Sync {
    async fn optimize(&self, prompt: &str) -> Result<String, BackendError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to a running optimizer service over HTTP
pub struct HttpBackend {
    endpoint: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(server_url: &str) -> Self {
        Self {
            endpoint: format!("{}/api/optimize", server_url.trim_end_matches('/')),
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OptimizerBackend for HttpBackend {
    async fn optimize(&self, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let result: OptimizationResult = response.json().await?;
        Ok(result.optimized_prompt)
    }
}

/// Calls the service directly, skipping the HTTP hop
#[async_trait]
impl OptimizerBackend for OptimizationService {
    async fn optimize(&self, prompt: &str) -> Result<String, BackendError> {
        let result = OptimizationService::optimize(self, OptimizationRequest::new(prompt)).await?;
        Ok(result.optimized_prompt)
    }
}
