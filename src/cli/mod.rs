//! Command-line interface for git2s3.

pub mod args;
mod commands;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app::{App, AppError};

pub use args::{ArgsError, GlobalArgs, InputSource, OutputSink};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument processing error.
    #[error("{0}")]
    Args(#[from] ArgsError),

    /// App error.
    #[error("{0}")]
    App(#[from] AppError),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// git2s3 - mirror pushed commits into S3 buckets.
#[derive(Parser, Debug)]
#[command(name = "git2s3", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process an event envelope read from a file or stdin.
    Handle(commands::handle::HandleArgs),

    /// Mirror a commit without an envelope.
    Replay(commands::replay::ReplayArgs),

    /// Print the environment suffix for a ref.
    Classify(commands::classify::ClassifyArgs),
}

// =============================================================================
// CLI Execution
// =============================================================================

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Classify(args) => args.run(&self.global).await,
            Command::Handle(args) => {
                let app = App::new(self.global.to_app_context())?;
                args.run(&app, &self.global).await
            }
            Command::Replay(args) => {
                let app = App::new(self.global.to_app_context())?;
                args.run(&app, &self.global).await
            }
        }
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.run().await
}
