/*!
 * # sublate
 *
 * A Rust library for machine translation of subtitle documents.
 *
 * ## Features
 *
 * - Parse and serialize SubRip (SRT) and WebVTT subtitle text
 * - Convert between the two formats with millisecond-exact timestamps
 * - Translate subtitle documents batch-wise through LLM providers:
 *   - Ollama (local LLM)
 *   - OpenAI API (and compatible endpoints)
 * - Content-addressed caching of finished translations with a 24h TTL
 * - Graceful degradation: translation faults return the original text
 *   instead of an error, so subtitle delivery never breaks
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Cue model and subtitle text codec
 * - `format_convert`: SRT <-> WebVTT format bridge
 * - `translation`: Model-powered translation pipeline:
 *   - `translation::core`: Translation service and per-document flow
 *   - `translation::batch`: Batch processing and output reconciliation
 *   - `translation::cache`: Caching of finished translations
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::mock`: Mock provider for tests
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod format_convert;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use subtitle_processor::{SubtitleDocument, SubtitleEntry, SubtitleFormat};
pub use translation::{TranslationCache, TranslationService};
