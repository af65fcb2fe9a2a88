use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::{Result, SourceControlError};
use super::source_control::SourceControl;
use super::types::CommitChangeSet;

/// An in-memory implementation of [`SourceControl`], intended primarily for testing.
///
/// Commits are keyed by sha and blobs by blob sha. Blob shas registered with
/// [`fail_blob`](Self::fail_blob) answer with an error.
#[derive(Default)]
pub struct MemorySourceControl {
    commits: RwLock<HashMap<String, CommitChangeSet>>,
    blobs: RwLock<HashMap<String, String>>,
    failing_blobs: RwLock<HashSet<String>>,
    blob_requests: AtomicUsize,
}

impl MemorySourceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commit, keyed by its commit id.
    pub fn insert_commit(&self, change_set: CommitChangeSet) {
        let mut commits = self.commits.write().unwrap();
        commits.insert(change_set.commit_id.clone(), change_set);
    }

    /// Register raw blob content; it is served base64-encoded.
    pub fn insert_blob(&self, blob_sha: impl Into<String>, content: &[u8]) {
        let mut blobs = self.blobs.write().unwrap();
        blobs.insert(blob_sha.into(), STANDARD.encode(content));
    }

    /// Register pre-encoded blob content, served exactly as given.
    pub fn insert_encoded_blob(&self, blob_sha: impl Into<String>, encoded: impl Into<String>) {
        let mut blobs = self.blobs.write().unwrap();
        blobs.insert(blob_sha.into(), encoded.into());
    }

    /// Make every fetch of this blob fail.
    pub fn fail_blob(&self, blob_sha: impl Into<String>) {
        self.failing_blobs.write().unwrap().insert(blob_sha.into());
    }

    /// Number of `get_blob` calls served so far, failed ones included.
    pub fn blob_requests(&self) -> usize {
        self.blob_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceControl for MemorySourceControl {
    async fn get_commit(
        &self,
        _owner: &str,
        repository: &str,
        sha: &str,
    ) -> Result<CommitChangeSet> {
        let commits = self.commits.read().unwrap();
        commits
            .get(sha)
            .filter(|c| c.repository == repository)
            .cloned()
            .ok_or_else(|| SourceControlError::NotFound(format!("{}@{}", repository, sha)))
    }

    async fn get_blob(&self, _owner: &str, _repository: &str, sha: &str) -> Result<String> {
        self.blob_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing_blobs.read().unwrap().contains(sha) {
            return Err(SourceControlError::Http {
                url: format!("memory://blobs/{}", sha),
                status: 502,
                message: "injected failure".to_string(),
            });
        }
        let blobs = self.blobs.read().unwrap();
        blobs
            .get(sha)
            .cloned()
            .ok_or_else(|| SourceControlError::NotFound(format!("blob {}", sha)))
    }
}
