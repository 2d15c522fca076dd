//! tensaku: explain English-grammar corrections to Japanese learners
//!
//! Given the student's original sentence and the corrected version, tensaku
//! prints one numbered line per corrected part with a Japanese reason.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Config;
use tensaku_core::{
    ChatBackend, LlmReasoner, OpenAiBackend, OpenAiConfig, ReasonInference, Reviewer,
    RuleBasedReasoner, sentence_edits,
};

/// Explain English-grammar corrections to a Japanese student
#[derive(Parser)]
#[command(name = "tensaku")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (default: search for .tensaku/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain the corrections between two sentences
    Explain {
        /// The student's original sentence
        #[arg(long)]
        original: String,

        /// The corrected sentence
        #[arg(long)]
        corrected: String,

        /// Reasoning engine: "llm" or "rules" (default: from config)
        #[arg(long)]
        engine: Option<String>,
    },

    /// Show the raw edits between two sentences
    Diff {
        /// The student's original sentence
        #[arg(long)]
        original: String,

        /// The corrected sentence
        #[arg(long)]
        corrected: String,
    },

    /// Check that the configured chat backend is reachable
    Check,
}

/// Initialize logging to stderr, plus a daily rolling file when a
/// .tensaku directory is available.
fn init_logging(tensaku_dir: Option<&std::path::Path>, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file_layer = tensaku_dir.and_then(|dir| {
        let logs_dir = dir.join("logs");
        std::fs::create_dir_all(&logs_dir).ok()?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "tensaku.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keep guard alive - dropping it would stop file logging
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
}

/// Load configuration from an explicit path or by directory discovery.
fn load_config(explicit: Option<&PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = Config::from_file(path)?;
        let dir = path.parent().map(|p| p.to_path_buf());
        return Ok((config, dir));
    }

    match Config::find_and_load()? {
        Some((config, dir)) => Ok((config, Some(dir))),
        None => Ok((Config::default(), None)),
    }
}

/// Build the chat backend from configuration.
fn create_backend(config: &Config) -> Result<Arc<OpenAiBackend>> {
    let mut backend_config = OpenAiConfig::new()
        .with_base_url(&config.backend.base_url)
        .with_model(&config.backend.model)
        .with_timeout(Duration::from_secs(config.backend.timeout_secs))
        .with_max_retries(config.backend.max_retries);

    if let Some(key) = config.backend.resolve_api_key() {
        backend_config = backend_config.with_api_key(key);
    }

    Ok(Arc::new(OpenAiBackend::new(backend_config)?))
}

/// Build the reviewer for the requested engine.
fn create_reviewer(config: &Config, engine_override: Option<&str>) -> Result<Reviewer> {
    let engine = engine_override.unwrap_or(&config.review.engine);

    match engine {
        "rules" => Ok(Reviewer::new(Arc::new(RuleBasedReasoner::new()))),
        "llm" => {
            let backend = create_backend(config)?;
            let reasoner = LlmReasoner::new(backend, &config.backend.model)
                .with_max_attempts(config.review.max_attempts);

            let mut reviewer = Reviewer::new(Arc::new(reasoner) as Arc<dyn ReasonInference>);
            if config.review.fallback_to_rules {
                reviewer = reviewer.with_fallback(Arc::new(RuleBasedReasoner::new()));
            }
            Ok(reviewer)
        }
        other => anyhow::bail!("Unknown engine: {} (expected \"llm\" or \"rules\")", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_dir) = load_config(cli.config.as_ref())?;
    init_logging(config_dir.as_deref(), cli.verbose);

    match &config_dir {
        Some(dir) => tracing::debug!(config_dir = %dir.display(), "Loaded configuration"),
        None => tracing::debug!("No .tensaku/config.toml found, using defaults"),
    }

    match cli.command {
        Commands::Explain {
            original,
            corrected,
            engine,
        } => {
            let reviewer = create_reviewer(&config, engine.as_deref())?;
            let list = reviewer.review(&original, &corrected).await?;
            println!("{}", list.render());
        }

        Commands::Diff {
            original,
            corrected,
        } => {
            let edits = sentence_edits(&original, &corrected);
            if edits.is_empty() {
                println!("(no edits)");
            }
            for edit in edits {
                println!("{:?} {}", edit.kind, edit.part_label());
            }
        }

        Commands::Check => {
            let backend = create_backend(&config)?;
            match backend.health_check().await {
                Ok(()) => println!("ok: {} reachable", config.backend.base_url),
                Err(e) => {
                    eprintln!("backend check failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
