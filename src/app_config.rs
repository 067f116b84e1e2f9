use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO 639-1)
    pub source_language: String,

    /// Target language code (ISO 639-1)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI (or any OpenAI-compatible endpoint)
    OpenAI,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Provider type
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Model name; empty picks the provider default
    #[serde(default = "String::new")]
    pub model: String,

    /// API key (OpenAI only)
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL; empty picks the provider default
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Number of cues per translation batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of concurrent batch requests
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,

    /// Sampling temperature; low values favor deterministic output
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output-length ceiling per batch request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether the translation cache is enabled
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl TranslationConfig {
    /// Model name, falling back to the provider default
    pub fn get_model(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }
        match self.provider {
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::OpenAI => default_openai_model(),
        }
    }

    /// Endpoint URL, falling back to the provider default
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }
        match self.provider {
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            model: String::new(),
            api_key: String::new(),
            endpoint: String::new(),
            batch_size: default_batch_size(),
            max_concurrent_batches: default_max_concurrent_batches(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            cache_enabled: default_cache_enabled(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language must not be empty"));
        }

        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }

        if self
            .source_language
            .eq_ignore_ascii_case(&self.target_language)
        {
            return Err(anyhow!(
                "Source and target language must differ, both are '{}'",
                self.source_language
            ));
        }

        if self.translation.batch_size == 0 {
            return Err(anyhow!("Batch size must be greater than zero"));
        }

        if !(0.0..=2.0).contains(&self.translation.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.translation.temperature
            ));
        }

        if self.translation.max_tokens == 0 {
            return Err(anyhow!("Max tokens must be greater than zero"));
        }

        if self.translation.provider == TranslationProvider::OpenAI
            && self.translation.api_key.trim().is_empty()
        {
            return Err(anyhow!("The OpenAI provider requires an API key"));
        }

        Ok(())
    }
}

fn default_batch_size() -> usize {
    crate::translation::BATCH_SIZE
}

fn default_max_concurrent_batches() -> usize {
    3
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
