/*!
 * Provider implementations for model backends.
 *
 * This module contains client implementations for the supported LLM
 * providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API (and any OpenAI-compatible endpoint)
 *
 * A mock provider is included for exercising the pipeline in tests.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One completion request sent to a provider
///
/// The pipeline keeps prompt construction on its side; a provider only sees
/// the finished system and user text plus the sampling configuration.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt guiding the model
    pub system: Option<String>,

    /// User prompt carrying the text to translate
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Output-length ceiling in tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with default sampling
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output-length ceiling
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Common trait for all LLM providers
///
/// Object-safe so the translation service can hold an injected
/// `Arc<dyn Provider>` and tests can substitute a mock.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request, returning the model's raw text output
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider identifier for logs
    fn name(&self) -> &'static str;
}

pub mod mock;
pub mod ollama;
pub mod openai;
