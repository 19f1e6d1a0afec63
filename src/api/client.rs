//! Generic API client for hosted completion providers

use super::{
    ApiConfig, ApiError, CompletionProvider, CompletionRequest, CompletionResponse, ProviderType,
    Role, TokenUsage,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

/// Generic API agent that can work with multiple providers
pub struct ApiAgent {
    config: ApiConfig,
    client: Client,
}

impl ApiAgent {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn provider_type(&self) -> ProviderType {
        self.config.provider
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn base_url(&self) -> Result<String, ApiError> {
        self.config
            .base_url
            .clone()
            .or_else(|| self.config.provider.default_base_url().map(str::to_string))
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| ApiError::Provider("Custom provider requires base_url".into()))
    }

    fn endpoint(&self) -> Result<String, ApiError> {
        let base = self.base_url()?;
        let path = match self.config.provider {
            ProviderType::Claude => "messages",
            ProviderType::Ollama => "api/chat",
            ProviderType::OpenAI | ProviderType::Custom => "chat/completions",
        };
        Ok(format!("{}/{}", base, path))
    }

    fn build_claude_request(&self, request: &CompletionRequest) -> Value {
        // System instruction travels at the top level, not as a message
        let mut body = json!({
            "model": self.config.model,
            "system": request.system,
            "messages": [{
                "role": "user",
                "content": request.prompt
            }],
            "max_tokens": request.max_tokens,
        });

        if let Some(temp) = self.config.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }

    fn build_openai_request(&self, request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request
            .messages()
            .into_iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                json!({ "role": role, "content": msg.content })
            })
            .collect();

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
        });

        if let Some(temp) = self.config.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }

    fn build_ollama_request(&self, request: &CompletionRequest) -> Value {
        let mut options = json!({ "num_predict": request.max_tokens });
        if let Some(temp) = self.config.temperature {
            options["temperature"] = json!(temp);
        }

        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt }
            ],
            "stream": false,
            "options": options,
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        match self.config.provider {
            ProviderType::Claude => self.build_claude_request(request),
            ProviderType::Ollama => self.build_ollama_request(request),
            ProviderType::OpenAI | ProviderType::Custom => self.build_openai_request(request),
        }
    }

    fn parse_claude_response(&self, response: Value) -> Result<CompletionResponse, ApiError> {
        let content = response["content"][0]["text"]
            .as_str()
            .ok_or_else(|| ApiError::Provider("Missing content in response".into()))?
            .to_string();

        let usage = TokenUsage::from_counts(
            response["usage"]["input_tokens"].as_u64(),
            response["usage"]["output_tokens"].as_u64(),
        );

        Ok(CompletionResponse {
            content,
            usage,
            model: response["model"].as_str().unwrap_or(&self.config.model).to_string(),
            truncated: response["stop_reason"].as_str() == Some("max_tokens"),
        })
    }

    fn parse_openai_response(&self, response: Value) -> Result<CompletionResponse, ApiError> {
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ApiError::Provider("Missing content in response".into()))?
            .to_string();

        let usage = TokenUsage::from_counts(
            response["usage"]["prompt_tokens"].as_u64(),
            response["usage"]["completion_tokens"].as_u64(),
        );

        Ok(CompletionResponse {
            content,
            usage,
            model: response["model"].as_str().unwrap_or(&self.config.model).to_string(),
            truncated: response["choices"][0]["finish_reason"].as_str() == Some("length"),
        })
    }

    fn parse_ollama_response(&self, response: Value) -> Result<CompletionResponse, ApiError> {
        let content = response["message"]["content"]
            .as_str()
            .ok_or_else(|| ApiError::Provider("Missing message in response".into()))?
            .to_string();

        let usage = TokenUsage::from_counts(
            response["prompt_eval_count"].as_u64(),
            response["eval_count"].as_u64(),
        );

        Ok(CompletionResponse {
            content,
            usage,
            model: response["model"].as_str().unwrap_or(&self.config.model).to_string(),
            truncated: response["done_reason"].as_str() == Some("length"),
        })
    }

    fn parse_response(&self, json: Value) -> Result<CompletionResponse, ApiError> {
        match self.config.provider {
            ProviderType::Claude => self.parse_claude_response(json),
            ProviderType::Ollama => self.parse_ollama_response(json),
            ProviderType::OpenAI | ProviderType::Custom => self.parse_openai_response(json),
        }
    }

    /// Send a request and return the full provider response
    pub async fn send_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ApiError> {
        let url = self.endpoint()?;
        let body = self.build_body(request);

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        builder = match self.config.provider {
            ProviderType::Claude => builder
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", "2023-06-01"),
            ProviderType::Ollama => builder,
            ProviderType::OpenAI | ProviderType::Custom => {
                builder.header("Authorization", format!("Bearer {}", self.config.api_key))
            }
        };

        let response = builder.json(&body).send().await?;
        let status = response.status();

        if status.is_success() {
            let json: Value = response.json().await?;
            self.parse_response(json)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(status_error(status, error_text))
        }
    }
}

fn status_error(status: StatusCode, body: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::Auth(format!("{}: {}", status, body))
        }
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
            retry_after_secs: 60,
        },
        _ => ApiError::Provider(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl CompletionProvider for ApiAgent {
    async fn generate_completion(
        &self,
        system: &str,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, ApiError> {
        let request = CompletionRequest::new(system, prompt, max_output_tokens);
        let response = self.send_request(&request).await?;

        debug!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            truncated = response.truncated,
            "Completion received"
        );

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(provider: ProviderType) -> ApiAgent {
        ApiAgent::new(ApiConfig {
            provider,
            api_key: "test-key".to_string(),
            base_url: None,
            model: "test-model".to_string(),
            temperature: None,
        })
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("be brief", "Optimize this prompt for fewer tokens:\n\nhello", 1000)
    }

    #[test]
    fn test_endpoints_per_provider() {
        assert_eq!(
            agent(ProviderType::OpenAI).endpoint().unwrap(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            agent(ProviderType::Claude).endpoint().unwrap(),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(
            agent(ProviderType::Ollama).endpoint().unwrap(),
            "http://localhost:11434/api/chat"
        );
        assert!(agent(ProviderType::Custom).endpoint().is_err());
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let agent = ApiAgent::new(ApiConfig {
            provider: ProviderType::Custom,
            api_key: String::new(),
            base_url: Some("http://localhost:8080/v1/".to_string()),
            model: "m".to_string(),
            temperature: None,
        });
        assert_eq!(
            agent.endpoint().unwrap(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_openai_body_carries_budget_and_messages() {
        let body = agent(ProviderType::OpenAI).build_body(&request());
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_claude_body_puts_system_at_top_level() {
        let body = agent(ProviderType::Claude).build_body(&request());
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_ollama_body_disables_streaming() {
        let body = agent(ProviderType::Ollama).build_body(&request());
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 1000);
    }

    #[test]
    fn test_parse_openai_response() {
        let json = json!({
            "model": "gpt",
            "choices": [{ "message": { "content": "  short  " }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 40, "completion_tokens": 3 }
        });
        let response = agent(ProviderType::OpenAI).parse_response(json).unwrap();
        assert_eq!(response.content, "  short  ");
        assert_eq!(response.usage, TokenUsage::new(40, 3));
        assert!(!response.truncated);
    }

    #[test]
    fn test_parse_claude_response_truncated() {
        let json = json!({
            "content": [{ "type": "text", "text": "x" }],
            "stop_reason": "max_tokens",
            "usage": { "input_tokens": 1, "output_tokens": 1000 }
        });
        let response = agent(ProviderType::Claude).parse_response(json).unwrap();
        assert!(response.truncated);
        assert_eq!(response.model, "test-model");
    }

    #[test]
    fn test_parse_missing_content_is_error() {
        let result = agent(ProviderType::OpenAI).parse_response(json!({ "choices": [] }));
        assert!(matches!(result, Err(ApiError::Provider(_))));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            ApiError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ApiError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "down".into()),
            ApiError::Provider(msg) if msg.contains("down")
        ));
    }
}
