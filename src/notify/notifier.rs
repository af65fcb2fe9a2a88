use async_trait::async_trait;

/// Error type for completion notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("publish to {topic} failed: {message}")]
    PublishFailed { topic: String, message: String },
}

/// Result type for notifications.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Announces that a commit has been mirrored.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, message: &str) -> Result<()>;
}

/// Summary line published after a successful upload.
pub fn completion_message(owner: &str, repository: &str, suffix: &str, sha: &str) -> String {
    format!(
        "Finished upload of {} {} {} {}",
        owner, repository, suffix, sha
    )
}
