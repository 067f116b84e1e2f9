use anyhow::Result;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// OpenAI client, also usable against any OpenAI-compatible endpoint
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Model name to complete with
    model: String,
}

/// Chat message object
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    role: String,
    /// Content of the message
    content: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    /// The model to use
    model: &'a str,
    /// The messages for the conversation
    messages: Vec<ChatMessage>,
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    /// Completion choices
    choices: Vec<ChatChoice>,
}

/// Individual completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// The generated message
    message: ChatMessage,
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.is_empty() {
            "https://api.openai.com/v1".to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let api_url = format!("{}/chat/completions", self.endpoint);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ProviderError::AuthenticationError(format!(
                "API key rejected ({})",
                status
            )));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            error!("OpenAI API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::ParseError("response contained no choices".to_string()))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let probe = CompletionRequest::new("Hello").max_tokens(1);
        self.complete(probe).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
