use async_trait::async_trait;
use tracing::info;

use super::notifier::{Notifier, Result};

/// A [`Notifier`] that only logs. Used when no topic is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, message: &str) -> Result<()> {
        info!(subject, summary = message, "completion");
        Ok(())
    }
}
