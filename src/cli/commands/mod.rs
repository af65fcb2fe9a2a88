//! Subcommand implementations.

pub mod classify;
pub mod handle;
pub mod replay;

use crate::app::{AppError, Outcome, Result as AppResult};
use crate::cli::{GlobalArgs, OutputSink, Result};

/// Print a handler outcome and turn a failed run into the command's error.
///
/// With `--json`, a partially failed commit still prints its per-file result
/// before the error is returned.
async fn report(result: AppResult<Outcome>, global: &GlobalArgs) -> Result<()> {
    let output = OutputSink;
    match result {
        Ok(outcome) => {
            if global.json {
                output.write_json(&outcome).await?;
            } else {
                match &outcome {
                    Outcome::Ignored { event_type } => {
                        let event_type = event_type.as_deref().unwrap_or("<none>");
                        output
                            .write_str(&format!("ignored {} event", event_type))
                            .await?;
                    }
                    Outcome::Completed { summary, .. } => output.write_str(summary).await?,
                }
            }
            Ok(())
        }
        Err(AppError::Reconcile(err)) => {
            match (global.json, err.result()) {
                (true, Some(result)) => output.write_json(result).await?,
                (false, Some(result)) => {
                    for failure in &result.failures {
                        output.write_str(&failure.to_string()).await?;
                    }
                }
                _ => {}
            }
            Err(AppError::Reconcile(err).into())
        }
        Err(err) => Err(err.into()),
    }
}
