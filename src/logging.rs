//! Process-wide log setup, done once from `main` with an explicit config.
//!
//! Diagnostics go to standard error or an append-mode file so that report
//! output on standard output stays clean.

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// timestamp LEVEL target: message
    #[default]
    Compact,
    Full,
    /// Multi-line, for reading by eye
    Pretty,
    /// JSON Lines
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// A level name (any case) or an `EnvFilter` directive string.
    pub level: String,
    pub format: LogFormat,
    /// Standard error when unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Build the filter for `level`. Bare level names are matched
/// case-insensitively; anything else is parsed as directives.
pub fn build_env_filter(level: &str) -> Result<EnvFilter> {
    let level = level.trim();
    let directives = match level.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        lower @ ("off" | "error" | "warn" | "info" | "debug" | "trace") => lower.to_string(),
        _ => level.to_string(),
    };
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))
}

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = build_env_filter(&config.level)?;

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}
