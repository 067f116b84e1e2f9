/*!
 * Error types for the sublate library.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to a model provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur during subtitle parsing and serialization
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// No recoverable cues were found in the input
    #[error("no subtitle cues could be recovered from the input")]
    NoCues,

    /// A timestamp could not be parsed
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A cue violated a structural invariant
    #[error("invalid cue {seq_num}: {reason}")]
    InvalidCue {
        /// 1-based cue number
        seq_num: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A format name could not be recognized
    #[error("unknown subtitle format: {0}")]
    UnknownFormat(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Every batch in a document failed at the model-call level
    #[error("all {0} translation batches failed")]
    AllBatchesFailed(usize),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
