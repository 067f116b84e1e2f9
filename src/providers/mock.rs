/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - echoes the prompt back, so segment counts
 *   always align
 * - `MockProvider::failing()` - always fails with an API error
 * - `MockProvider::mismatched()` - returns output that cannot be aligned
 * - `MockProvider::empty()` - returns an empty response
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echo the prompt back unchanged; alignment always succeeds
    Working,
    /// Always fail with an API error
    Failing,
    /// Return output whose segment count never matches the request
    Mismatched,
    /// Return an empty response
    Empty,
}

/// Mock provider for exercising the translation pipeline
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of completion calls received
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that echoes prompts
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose output never aligns with the request
    pub fn mismatched() -> Self {
        Self::new(MockBehavior::Mismatched)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of completion calls this provider has received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => {
                if let Some(generator) = self.custom_response {
                    Ok(generator(&request))
                } else {
                    Ok(request.prompt)
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Mismatched => Ok("nonsense".to_string()),

            MockBehavior::Empty => Ok(String::new()),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
