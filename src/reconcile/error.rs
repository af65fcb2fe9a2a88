//! Error types for commit reconciliation.

use super::result::ReconciliationResult;
use crate::source_control::SourceControlError;

/// Commit-level failure.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The commit metadata could not be fetched; no file was touched.
    #[error("commit lookup failed for {sha}: {source}")]
    CommitLookupFailed {
        sha: String,
        #[source]
        source: SourceControlError,
    },

    /// The commit changed no files; no file was touched.
    #[error("no files changed in commit {commit_id}")]
    NoChanges { commit_id: String },

    /// Some files failed. The full per-file detail is attached.
    #[error(
        "{} of {} files failed for commit {}",
        .0.failed_count(),
        .0.total_files,
        .0.commit_id
    )]
    FilesFailed(ReconciliationResult),
}

impl ReconcileError {
    /// Per-file detail, present only for [`ReconcileError::FilesFailed`].
    pub fn result(&self) -> Option<&ReconciliationResult> {
        match self {
            ReconcileError::FilesFailed(result) => Some(result),
            _ => None,
        }
    }
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, ReconcileError>;
