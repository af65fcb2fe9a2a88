use async_trait::async_trait;

use super::error::Result;
use super::types::CommitChangeSet;

/// Read access to a source control host.
///
/// Implementations are pre-authenticated; credentials are a construction
/// concern, never a per-call one.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Fetch the authoritative file-change list of a commit.
    ///
    /// The returned change set has no `git_ref`; the caller knows which ref
    /// was pushed.
    async fn get_commit(&self, owner: &str, repository: &str, sha: &str)
    -> Result<CommitChangeSet>;

    /// Fetch one blob's content as base64 text.
    async fn get_blob(&self, owner: &str, repository: &str, sha: &str) -> Result<String>;
}
