use serde::Serialize;

use super::error::{ReconcileError, Result};
use super::plan::OpKind;

/// Why a plan step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file content could not be retrieved from source control.
    FetchFailed,
    /// The object store rejected the put or delete.
    StoreFailed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::FetchFailed => f.write_str("fetch failed"),
            FailureKind::StoreFailed => f.write_str("store failed"),
        }
    }
}

/// One failed step of a file's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub op: OpKind,
    /// Object key the step targeted.
    pub key: String,
    pub kind: FailureKind,
    pub message: String,
}

/// A change record whose plan had at least one failed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Current path of the change record.
    pub path: String,
    pub steps: Vec<StepFailure>,
}

impl FileFailure {
    /// The first failure kind, which is what callers usually alert on.
    pub fn kind(&self) -> Option<FailureKind> {
        self.steps.first().map(|s| s.kind)
    }
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.path)?;
        for step in &self.steps {
            write!(f, " {} {} ({}: {});", step.op, step.key, step.kind, step.message)?;
        }
        Ok(())
    }
}

/// Outcome of reconciling one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub commit_id: String,
    pub bucket: String,
    /// Number of change records processed.
    pub total_files: usize,
    /// Failing records, in change-set order.
    pub failures: Vec<FileFailure>,
}

impl ReconciliationResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn succeeded_count(&self) -> usize {
        self.total_files - self.failures.len()
    }

    /// The failure recorded for `path`, if that file failed.
    pub fn failure_for(&self, path: &str) -> Option<&FileFailure> {
        self.failures.iter().find(|f| f.path == path)
    }

    /// Turn the result into the commit's verdict: failed iff any file failed.
    pub fn into_verdict(self) -> Result<ReconciliationResult> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ReconcileError::FilesFailed(self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_lookup() {
        let result = ReconciliationResult {
            commit_id: "abc".to_string(),
            bucket: "demo".to_string(),
            total_files: 3,
            failures: vec![FileFailure {
                path: "a.txt".to_string(),
                steps: vec![StepFailure {
                    op: OpKind::Put,
                    key: "a.txt".to_string(),
                    kind: FailureKind::FetchFailed,
                    message: "boom".to_string(),
                }],
            }],
        };

        assert!(!result.is_success());
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.succeeded_count(), 2);
        assert_eq!(
            result.failure_for("a.txt").and_then(FileFailure::kind),
            Some(FailureKind::FetchFailed)
        );
        assert!(result.failure_for("b.txt").is_none());
        assert_eq!(
            result.failures[0].to_string(),
            "a.txt: put a.txt (fetch failed: boom);"
        );
    }

    #[test]
    fn test_serializes_failure_kinds() {
        let json = serde_json::to_string(&FailureKind::StoreFailed).unwrap();
        assert_eq!(json, "\"store_failed\"");
    }
}
