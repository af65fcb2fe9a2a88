//! Process one inbound event envelope.

use clap::Args;

use crate::app::App;
use crate::cli::{GlobalArgs, InputSource, Result};
use crate::event::parse_envelope;

/// Arguments for the handle command.
#[derive(Args, Debug)]
pub struct HandleArgs {
    #[command(flatten)]
    pub input: InputSource,
}

impl HandleArgs {
    pub async fn run(self, app: &App, global: &GlobalArgs) -> Result<()> {
        let json = self.input.read().await?;
        let envelope = parse_envelope(&json).map_err(crate::app::AppError::from)?;
        let handler = app.create_handler().await?;
        super::report(handler.handle(&envelope).await, global).await
    }
}
