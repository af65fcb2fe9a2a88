//! Print the environment suffix for a ref.

use clap::Args;
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputSink, Result};
use crate::destination::classify;

/// Arguments for the classify command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Git ref, e.g. refs/heads/master.
    pub git_ref: String,
}

#[derive(Serialize)]
struct Classification<'a> {
    git_ref: &'a str,
    suffix: String,
}

impl ClassifyArgs {
    pub async fn run(self, global: &GlobalArgs) -> Result<()> {
        let suffix = classify(&self.git_ref);
        if global.json {
            OutputSink
                .write_json(&Classification {
                    git_ref: &self.git_ref,
                    suffix,
                })
                .await?;
        } else {
            OutputSink.write_str(&suffix).await?;
        }
        Ok(())
    }
}
