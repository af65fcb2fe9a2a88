//! Command-line argument definitions and helpers.

use std::path::PathBuf;

use clap::Args;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::app::AppContext;
use crate::config::{ConfigSource, parse_override};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during argument processing.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// I/O error reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument combination.
    #[error("{0}")]
    InvalidArgs(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for argument operations.
pub type Result<T> = std::result::Result<T, ArgsError>;

// =============================================================================
// Global Arguments
// =============================================================================

/// Global arguments that apply to all commands.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the main configuration file.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// Path to the configuration overrides file.
    #[arg(long = "config-file-overrides", global = true)]
    pub config_file_overrides: Option<PathBuf>,

    /// Configuration overrides in the form section.key=value.
    #[arg(long = "config", value_parser = parse_override, global = true)]
    pub config_overrides: Vec<(String, String)>,

    /// Format output as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Convert to a ConfigSource for reading configuration.
    pub fn to_config_source(&self) -> ConfigSource {
        ConfigSource {
            config_file: self.config_file.clone(),
            override_file: self.config_file_overrides.clone(),
            overrides: self.config_overrides.clone(),
        }
    }

    /// Convert to an AppContext for creating an App.
    pub fn to_app_context(&self) -> AppContext {
        AppContext {
            config_source: self.to_config_source(),
        }
    }
}

// =============================================================================
// Input/Output Helpers
// =============================================================================

/// Helper for commands that read an event document from a file or stdin.
#[derive(Args, Debug, Default)]
pub struct InputSource {
    /// Read the event from this file instead of stdin.
    #[arg(id = "event_file", long = "event-file")]
    pub file: Option<PathBuf>,
}

impl InputSource {
    /// Read the whole input. Falls back to stdin when no file is given.
    pub async fn read(&self) -> Result<String> {
        let contents = match &self.file {
            Some(path) => tokio::fs::read_to_string(path).await?,
            None => {
                let mut contents = String::new();
                tokio::io::stdin().read_to_string(&mut contents).await?;
                contents
            }
        };
        if contents.trim().is_empty() {
            return Err(ArgsError::InvalidArgs("no event input".to_string()));
        }
        Ok(contents)
    }
}

/// Helper for commands that write output to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutputSink;

impl OutputSink {
    /// Write a line to stdout.
    pub async fn write_str(&self, value: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(value.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(())
    }

    /// Write a value as pretty JSON.
    pub async fn write_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.write_str(&output).await
    }
}
