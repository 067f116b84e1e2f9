use anyhow::Result;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Ollama client for interacting with a local Ollama server
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model name to generate with
    model: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    /// Model name to use for generation
    model: &'a str,
    /// Prompt to generate from
    prompt: &'a str,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    /// Whether to stream the response
    stream: bool,
    /// Additional model parameters
    options: GenerateOptions,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
struct GenerateOptions {
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of tokens to generate
    num_predict: u32,
}

/// Generate response from the Ollama API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    /// Generated text
    response: String,
}

impl Ollama {
    /// Create a new Ollama client
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        let base_url = if endpoint.is_empty() {
            "http://localhost:11434".to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Self {
            base_url,
            model: model.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let api_url = format!("{}/api/generate", self.base_url);

        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::ConnectionError(format!(
                        "could not reach Ollama at {}: {}",
                        self.base_url, e
                    ))
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            error!("Ollama API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let generated = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(generated.response)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let api_url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&api_url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "Ollama server did not answer the tags probe".to_string(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
