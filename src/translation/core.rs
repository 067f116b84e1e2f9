/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which owns the whole
 * per-document pipeline: cache lookup, decode, batching, model calls,
 * reassembly, encode, and cache write. Its public entry point never fails;
 * a broken subtitle file is worse than an untranslated one, so every fault
 * degrades to returning the caller's original content.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{debug, warn};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{SubtitleError, TranslationError};
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::subtitle_processor::{SubtitleDocument, SubtitleEntry};

use super::batch::BatchTranslator;
use super::cache::TranslationCache;

/// Validate an endpoint string, normalizing it to a base URL
fn endpoint_base(endpoint: &str) -> Result<String> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;

    Ok(url.to_string().trim_end_matches('/').to_string())
}

/// Main translation service for subtitle documents
pub struct TranslationService {
    /// Provider implementation
    provider: Arc<dyn Provider>,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Translation cache for storing and retrieving translated documents
    pub cache: TranslationCache,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let endpoint = endpoint_base(&config.get_endpoint())?;
        let model = config.get_model();

        let provider: Arc<dyn Provider> = match config.provider {
            ConfigTranslationProvider::Ollama => {
                Arc::new(Ollama::new(endpoint, model, config.timeout_secs))
            }
            ConfigTranslationProvider::OpenAI => Arc::new(OpenAI::new(
                config.api_key.clone(),
                endpoint,
                model,
                config.timeout_secs,
            )),
        };

        Ok(Self::with_provider(config, provider))
    }

    /// Create a translation service around an injected provider
    pub fn with_provider(config: TranslationConfig, provider: Arc<dyn Provider>) -> Self {
        let cache = TranslationCache::with_ttl(
            config.cache_enabled,
            Duration::from_secs(config.cache_ttl_secs),
        );
        Self::with_provider_and_cache(config, provider, cache)
    }

    /// Create a translation service around an injected provider and cache
    ///
    /// The cache is constructed once at startup and passed by reference-
    /// counted handle, so several services can share one store.
    pub fn with_provider_and_cache(
        config: TranslationConfig,
        provider: Arc<dyn Provider>,
        cache: TranslationCache,
    ) -> Self {
        Self {
            provider,
            config,
            cache,
        }
    }

    /// Test the connection to the configured provider
    pub async fn test_connection(&self) -> Result<()> {
        self.provider.test_connection().await?;
        Ok(())
    }

    /// Translate a subtitle document, returning usable subtitle text
    ///
    /// Never fails: malformed input, provider faults, and anything
    /// unexpected all degrade to returning `content` unchanged.
    pub async fn translate_document(
        &self,
        content: &str,
        source_language: &str,
        target_language: &str,
    ) -> String {
        self.translate_document_with_progress(content, source_language, target_language, |_, _| {})
            .await
    }

    /// Translate a subtitle document, reporting (done, total) batch counts
    pub async fn translate_document_with_progress(
        &self,
        content: &str,
        source_language: &str,
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> String {
        match self
            .try_translate_document(content, source_language, target_language, progress_callback)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation failed, returning original subtitle: {:#}", e);
                content.to_string()
            }
        }
    }

    /// The fallible pipeline behind the public entry point
    async fn try_translate_document(
        &self,
        content: &str,
        source_language: &str,
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<String> {
        // Lookup
        let key = TranslationCache::key(content, source_language, target_language);
        if let Some(cached) = self.cache.get(&key) {
            debug!(
                "Returning cached translation ({} -> {})",
                source_language, target_language
            );
            return Ok(cached);
        }

        // Decode; undecodable input is served back untranslated and must
        // never be written to the cache
        let mut document = match SubtitleDocument::parse(content, None) {
            Ok(document) => document,
            Err(SubtitleError::NoCues) => {
                warn!("No cues recovered from input, returning content unchanged");
                return Ok(content.to_string());
            }
            Err(e) => return Err(e.into()),
        };

        let source_name = language_utils::display_name(source_language);
        let target_name = language_utils::display_name(target_language);
        debug!(
            "Translating {} cues from {} to {}",
            document.len(),
            source_name,
            target_name
        );

        // Partition and translate batch-wise
        let batches: Vec<&[SubtitleEntry]> =
            document.entries.chunks(self.config.batch_size.max(1)).collect();
        let batch_count = batches.len();

        let translator = BatchTranslator::new(
            self.provider.clone(),
            self.config.max_concurrent_batches,
            self.config.temperature,
            self.config.max_tokens,
        );
        let outcomes = translator
            .translate_batches(&batches, &source_name, &target_name, progress_callback)
            .await;

        // When every batch died at the model-call level nothing was
        // translated at all; surface that as a pipeline failure so the
        // caller gets the original input back verbatim, uncached.
        let hard_failures = outcomes.iter().filter(|o| o.hard_failure).count();
        if batch_count > 0 && hard_failures == batch_count {
            return Err(TranslationError::AllBatchesFailed(batch_count).into());
        }
        if hard_failures > 0 {
            warn!(
                "{} of {} batches failed and keep their original text",
                hard_failures, batch_count
            );
        }

        // Reassemble: texts land back on the cues in original order, timing
        // untouched
        let texts: Vec<String> = outcomes.into_iter().flat_map(|o| o.texts).collect();
        debug_assert_eq!(texts.len(), document.entries.len());
        for (entry, text) in document.entries.iter_mut().zip(texts) {
            entry.text = text;
        }

        // Encode in the source document's own format, then cache
        let rendered = document.render();
        self.cache.put(&key, &rendered);

        Ok(rendered)
    }
}
