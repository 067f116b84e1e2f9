/*!
 * Translation pipeline for subtitle documents.
 *
 * This module contains the core functionality for translating subtitle
 * documents through a model provider. It is split into several submodules:
 *
 * - `core`: Translation service and the per-document pipeline
 * - `batch`: Batch partitioning and model-output reconciliation
 * - `cache`: Content-addressed TTL cache for finished translations
 */

// Re-export main types for easier usage
pub use self::batch::{BATCH_SIZE, BatchTranslator, SEGMENT_MARKER};
pub use self::cache::{Clock, SystemClock, TranslationCache};
pub use self::core::TranslationService;

// Submodules
pub mod batch;
pub mod cache;
pub mod core;
