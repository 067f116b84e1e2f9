// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use sublate::app_config::{Config, LogLevel, TranslationProvider};
use sublate::subtitle_processor::SubtitleDocument;
use sublate::translation::TranslationService;
use sublate::{format_convert, language_utils};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// sublate - subtitle machine translation
///
/// Translates SRT/WebVTT subtitle files using an LLM provider, or converts
/// between the two formats.
#[derive(Parser, Debug)]
#[command(name = "sublate")]
#[command(version)]
#[command(about = "LLM-powered subtitle translation and format conversion")]
struct CommandLineOptions {
    /// Input subtitle file (.srt or .vtt)
    #[arg(value_name = "INPUT_FILE")]
    input_path: PathBuf,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key (OpenAI provider), also read from SUBLATE_API_KEY
    #[arg(long, env = "SUBLATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Output file path; defaults to <stem>.<target>.<ext>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Convert between SRT and WebVTT instead of translating
    #[arg(long)]
    convert_only: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Build the output path next to the input, tagged with the target language
fn generate_output_path(input_file: &Path, target_language: &str, extension: &str) -> PathBuf {
    let stem = input_file.file_stem().unwrap_or_default();

    let mut output_filename = stem.to_string_lossy().to_string();
    output_filename.push('.');
    output_filename.push_str(target_language);
    output_filename.push('.');
    output_filename.push_str(extension);

    input_file
        .parent()
        .unwrap_or(Path::new("."))
        .join(output_filename)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default;
    // the level is updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        let level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    // Load or create configuration
    let mut config = if Path::new(&cli.config_path).exists() {
        Config::from_file(&cli.config_path)?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            cli.config_path
        );
        let config = Config::default();
        config.to_file(&cli.config_path)?;
        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &cli.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &cli.model {
        config.translation.model = model.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.translation.api_key = api_key.clone();
    }
    if let Some(source_language) = &cli.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &cli.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.into());
    }

    if !cli.input_path.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", cli.input_path));
    }

    let content = std::fs::read_to_string(&cli.input_path)
        .with_context(|| format!("Failed to read subtitle file: {:?}", cli.input_path))?;

    if cli.convert_only {
        return run_convert(&cli, &content);
    }

    config.validate().context("Configuration validation failed")?;
    run_translate(&cli, &config, &content).await
}

/// Convert the input between SRT and WebVTT without translating
fn run_convert(cli: &CommandLineOptions, content: &str) -> Result<()> {
    let source_format = SubtitleDocument::detect_format(content);
    let target_format = source_format.other();

    let converted = format_convert::convert_to_other(content)
        .map_err(|e| anyhow!("Conversion failed: {}", e))?;

    let output_path = cli.output.clone().unwrap_or_else(|| {
        cli.input_path
            .with_extension(target_format.extension())
    });

    if output_path.exists() && !cli.force_overwrite {
        return Err(anyhow!(
            "Output file already exists: {:?}. Use -f to force overwrite.",
            output_path
        ));
    }

    std::fs::write(&output_path, converted)
        .with_context(|| format!("Failed to write output file: {:?}", output_path))?;

    info!("Converted {} -> {}: {:?}", source_format, target_format, output_path);
    Ok(())
}

/// Translate the input through the configured provider
async fn run_translate(cli: &CommandLineOptions, config: &Config, content: &str) -> Result<()> {
    let format = SubtitleDocument::detect_format(content);
    let output_path = cli.output.clone().unwrap_or_else(|| {
        generate_output_path(&cli.input_path, &config.target_language, format.extension())
    });

    if output_path.exists() && !cli.force_overwrite {
        return Err(anyhow!(
            "Output file already exists: {:?}. Use -f to force overwrite.",
            output_path
        ));
    }

    let service = TranslationService::new(config.translation.clone())?;

    info!(
        "Translating {:?} from {} to {} via {}",
        cli.input_path,
        language_utils::display_name(&config.source_language),
        language_utils::display_name(&config.target_language),
        config.translation.provider.display_name()
    );

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} batches {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let pb = progress_bar.clone();
    let translated = service
        .translate_document_with_progress(
            content,
            &config.source_language,
            &config.target_language,
            move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            },
        )
        .await;
    progress_bar.finish_and_clear();

    if translated == content {
        warn!("Output is identical to the input; the document may not have been translated");
    }

    std::fs::write(&output_path, translated)
        .with_context(|| format!("Failed to write output file: {:?}", output_path))?;

    let (hits, misses, hit_rate) = service.cache.stats();
    info!(
        "Done: {:?} (cache: {} hits, {} misses, {:.0}% hit rate)",
        output_path,
        hits,
        misses,
        hit_rate * 100.0
    );

    Ok(())
}
