//! Mirror a commit without an inbound envelope.

use clap::Args;

use crate::app::App;
use crate::cli::{GlobalArgs, Result};
use crate::event::PushEvent;

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Repository name.
    #[arg(long)]
    pub repository: String,

    /// Commit sha to mirror.
    #[arg(long)]
    pub sha: String,

    /// Ref the commit was pushed to, e.g. refs/heads/master.
    #[arg(long = "ref")]
    pub git_ref: String,

    /// Repository owner. Defaults to `[github] owner` from the config.
    #[arg(long)]
    pub owner: Option<String>,
}

impl ReplayArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let owner = match self.owner {
            Some(owner) => owner,
            None => app.config().config().github.owner.clone().ok_or_else(|| {
                crate::cli::CliError::Other(
                    "--owner is required when github.owner is not configured".to_string(),
                )
            })?,
        };
        let push = PushEvent::new(owner, self.repository, self.sha, self.git_ref);
        let handler = app.create_handler().await?;
        super::report(handler.replay(&push).await, global).await
    }
}
