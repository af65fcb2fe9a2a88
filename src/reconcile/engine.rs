//! The reconciliation engine.
//!
//! Applies the file changes of one commit to the object store. Every change
//! record gets its own [`OperationPlan`]; plans run concurrently and
//! independently, bounded by an optional [`FanOutLimit`]. Steps inside one plan
//! run in order, and a failed step never stops the next one: a rename whose
//! delete fails still uploads the new path. Failures are collected per record
//! into the [`ReconciliationResult`]; nothing short of an empty change set
//! aborts the batch.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::error::{ReconcileError, Result};
use super::plan::{OpKind, OperationPlan, StoreOp};
use super::result::{FailureKind, FileFailure, ReconciliationResult, StepFailure};
use crate::content::ContentResolver;
use crate::destination::DestinationPolicy;
use crate::object_store::ObjectStore;
use crate::source_control::{ChangeRecord, ChangeStatus, CommitChangeSet};
use crate::util::FanOutLimit;

/// Default number of change records processed at the same time.
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 16;

/// Applies commit change sets to an object store.
pub struct Reconciler {
    resolver: Arc<dyn ContentResolver>,
    store: Arc<dyn ObjectStore>,
    fan_out: Option<FanOutLimit>,
}

impl Reconciler {
    /// Create a reconciler with the default fan-out bound.
    pub fn new(resolver: Arc<dyn ContentResolver>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            resolver,
            store,
            fan_out: Some(FanOutLimit::new(DEFAULT_MAX_CONCURRENT_FILES)),
        }
    }

    /// Set the fan-out bound. `None` runs every plan at once.
    pub fn with_max_concurrent_files(mut self, limit: Option<usize>) -> Self {
        self.fan_out = limit.map(FanOutLimit::new);
        self
    }

    /// Reconcile a commit into the bucket chosen by `destination`.
    ///
    /// The bucket is resolved once from the change set's repository and ref.
    /// Returns [`ReconcileError::NoChanges`] for an empty change set before any
    /// store call; otherwise always returns the full result, failed files
    /// included. Use [`ReconciliationResult::into_verdict`] to turn per-file
    /// failures into an error.
    pub async fn reconcile(
        &self,
        change_set: &CommitChangeSet,
        destination: &DestinationPolicy,
    ) -> Result<ReconciliationResult> {
        let git_ref = change_set.git_ref.as_deref().unwrap_or_default();
        let bucket = destination.resolve(&change_set.repository, git_ref);
        debug!(
            repository = %change_set.repository,
            git_ref,
            suffix = %bucket.suffix,
            bucket = %bucket.name,
            "resolved destination bucket"
        );
        self.reconcile_into(change_set, &bucket.name).await
    }

    /// Reconcile a commit into an explicit bucket.
    pub async fn reconcile_into(
        &self,
        change_set: &CommitChangeSet,
        bucket: &str,
    ) -> Result<ReconciliationResult> {
        if change_set.is_empty() {
            warn!(
                commit = %change_set.commit_id,
                url = change_set.html_url.as_deref().unwrap_or(""),
                "no files changed"
            );
            return Err(ReconcileError::NoChanges {
                commit_id: change_set.commit_id.clone(),
            });
        }

        info!(
            commit = %change_set.commit_id,
            bucket,
            files = change_set.len(),
            "reconciling commit"
        );

        let outcomes = join_all(
            change_set
                .records
                .iter()
                .map(|record| self.apply(record, bucket)),
        )
        .await;

        let failures: Vec<FileFailure> = outcomes.into_iter().flatten().collect();
        let result = ReconciliationResult {
            commit_id: change_set.commit_id.clone(),
            bucket: bucket.to_string(),
            total_files: change_set.len(),
            failures,
        };

        if result.is_success() {
            info!(commit = %result.commit_id, files = result.total_files, "commit reconciled");
        } else {
            warn!(
                commit = %result.commit_id,
                failed = result.failed_count(),
                files = result.total_files,
                "commit reconciled with failures"
            );
        }
        Ok(result)
    }

    /// Run one record's plan to completion.
    async fn apply(&self, record: &ChangeRecord, bucket: &str) -> Option<FileFailure> {
        let _permit = match &self.fan_out {
            Some(limit) => Some(limit.acquire().await),
            None => None,
        };

        let mut steps = Vec::new();
        for op in OperationPlan::for_record(record) {
            if let Err(failure) = self.execute(op, bucket).await {
                if record.status() == ChangeStatus::Renamed && failure.op == OpKind::Delete {
                    warn!(
                        from = %failure.key,
                        to = record.path(),
                        bucket,
                        "rename could not remove the old object, uploading the new path anyway"
                    );
                }
                steps.push(failure);
            }
        }

        if steps.is_empty() {
            None
        } else {
            Some(FileFailure {
                path: record.path().to_string(),
                steps,
            })
        }
    }

    async fn execute(&self, op: StoreOp<'_>, bucket: &str) -> std::result::Result<(), StepFailure> {
        match op {
            StoreOp::Delete { key } => {
                debug!(key, bucket, "deleting object");
                match self.store.delete(bucket, key).await {
                    Ok(()) => {
                        info!(key, bucket, "delete succeeded");
                        Ok(())
                    }
                    Err(e) => {
                        warn!(key, bucket, error = %e, "delete failed");
                        Err(step_failure(op, FailureKind::StoreFailed, e.to_string()))
                    }
                }
            }
            StoreOp::Put { key, content } => {
                debug!(key, blob = %content.blob_sha, "fetching content");
                let resolved = match self.resolver.resolve(content).await {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!(key, bucket, error = %e, "upload failed, content unavailable");
                        return Err(step_failure(op, FailureKind::FetchFailed, e.to_string()));
                    }
                };

                let media_type = resolved.media_type;
                debug!(
                    key,
                    bucket,
                    media_type = %media_type,
                    bytes = resolved.body.len(),
                    "uploading object"
                );
                match self
                    .store
                    .put(bucket, key, resolved.body.into_bytes(), &media_type)
                    .await
                {
                    Ok(()) => {
                        info!(key, bucket, media_type = %media_type, "upload succeeded");
                        Ok(())
                    }
                    Err(e) => {
                        warn!(key, bucket, error = %e, "upload failed");
                        Err(step_failure(op, FailureKind::StoreFailed, e.to_string()))
                    }
                }
            }
        }
    }
}

fn step_failure(op: StoreOp<'_>, kind: FailureKind, message: String) -> StepFailure {
    StepFailure {
        op: op.kind(),
        key: op.key().to_string(),
        kind,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::content::{ContentError, ResolvedContent, SourceControlResolver, to_resolved};
    use crate::destination::SuffixedRepositories;
    use crate::object_store::{MemoryObjectStore, StoreCall};
    use crate::source_control::{
        ContentRef, MemorySourceControl, SourceControlError,
    };

    struct Fixture {
        source: Arc<MemorySourceControl>,
        store: Arc<MemoryObjectStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_store(MemoryObjectStore::new())
        }

        fn with_store(store: MemoryObjectStore) -> Self {
            Self {
                source: Arc::new(MemorySourceControl::new()),
                store: Arc::new(store),
            }
        }

        fn reconciler(&self) -> Reconciler {
            Reconciler::new(
                Arc::new(SourceControlResolver::new(self.source.clone())),
                self.store.clone(),
            )
        }

        /// Register a blob for `path` and return its content ref.
        fn blob(&self, path: &str, content: &[u8]) -> ContentRef {
            let sha = format!("blob-{}", path);
            self.source.insert_blob(sha.clone(), content);
            content_ref(path, &sha)
        }
    }

    fn content_ref(path: &str, sha: &str) -> ContentRef {
        ContentRef {
            owner: "acme".to_string(),
            repository: "demo".to_string(),
            path: path.to_string(),
            blob_sha: sha.to_string(),
        }
    }

    fn change_set(records: Vec<ChangeRecord>) -> CommitChangeSet {
        CommitChangeSet::new("demo", "c0ffee", records).with_git_ref("refs/heads/master")
    }

    #[tokio::test]
    async fn test_removed_issues_exactly_one_delete() {
        let fx = Fixture::new();
        fx.store.insert("demo", "c.png", b"png", "image/png");

        let set = change_set(vec![ChangeRecord::removed("c.png")]);
        let result = fx
            .reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(
            fx.store.calls(),
            vec![StoreCall::Delete {
                bucket: "demo".to_string(),
                key: "c.png".to_string()
            }]
        );
        assert!(!fx.store.contains("demo", "c.png"));
        assert_eq!(fx.source.blob_requests(), 0);
    }

    #[tokio::test]
    async fn test_renamed_deletes_previous_then_puts_current() {
        let fx = Fixture::new();
        fx.store.insert("demo", "old/b.js", b"old", "application/javascript");
        let blob = fx.blob("new/b.js", b"let b = 1;");

        let set = change_set(vec![ChangeRecord::renamed("old/b.js", "new/b.js", blob)]);
        let result = fx
            .reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap();

        assert!(result.is_success());
        let calls = fx.store.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].is_delete());
        assert_eq!(calls[0].key(), "old/b.js");
        assert!(calls[1].is_put());
        assert_eq!(calls[1].key(), "new/b.js");
        assert!(calls.iter().all(|c| c.bucket() == "demo"));
        assert!(!fx.store.contains("demo", "old/b.js"));
        assert_eq!(
            fx.store.get("demo", "new/b.js").unwrap().body,
            Bytes::from_static(b"let b = 1;")
        );
    }

    #[tokio::test]
    async fn test_rename_put_still_attempted_when_delete_fails() {
        let fx = Fixture::new();
        fx.store.fail_delete("old/b.js");
        let blob = fx.blob("new/b.js", b"let b = 1;");

        let set = change_set(vec![ChangeRecord::renamed("old/b.js", "new/b.js", blob)]);
        let result = fx
            .reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap();

        let calls = fx.store.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].is_delete());
        assert!(calls[1].is_put());
        assert!(fx.store.contains("demo", "new/b.js"));

        assert_eq!(result.failed_count(), 1);
        let failure = result.failure_for("new/b.js").unwrap();
        assert_eq!(failure.steps.len(), 1);
        assert_eq!(failure.steps[0].op, OpKind::Delete);
        assert_eq!(failure.steps[0].key, "old/b.js");
        assert_eq!(failure.steps[0].kind, FailureKind::StoreFailed);
    }

    #[tokio::test]
    async fn test_rename_with_both_steps_failing_is_one_failed_file() {
        let fx = Fixture::new();
        fx.store.fail_delete("old/b.js");
        fx.store.fail_put("new/b.js");
        let blob = fx.blob("new/b.js", b"x");

        let set = change_set(vec![ChangeRecord::renamed("old/b.js", "new/b.js", blob)]);
        let result = fx
            .reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap();

        assert_eq!(result.failed_count(), 1);
        let kinds: Vec<_> = result.failures[0]
            .steps
            .iter()
            .map(|s| (s.op, s.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (OpKind::Delete, FailureKind::StoreFailed),
                (OpKind::Put, FailureKind::StoreFailed)
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_failures_are_collected() {
        let fx = Fixture::new();
        let ok1 = fx.blob("ok1.txt", b"1");
        let ok2 = fx.blob("ok2.txt", b"2");
        let store_fail = fx.blob("store-fail.txt", b"3");
        fx.store.fail_put("store-fail.txt");

        let set = change_set(vec![
            ChangeRecord::added("ok1.txt", ok1),
            ChangeRecord::added("fetch-fail.txt", content_ref("fetch-fail.txt", "missing")),
            ChangeRecord::modified("ok2.txt", ok2),
            ChangeRecord::modified("store-fail.txt", store_fail),
            ChangeRecord::removed("gone.txt"),
        ]);
        let result = fx
            .reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap();

        assert_eq!(result.total_files, 5);
        assert_eq!(result.failed_count(), 2);
        assert_eq!(result.succeeded_count(), 3);
        assert_eq!(
            result.failure_for("fetch-fail.txt").and_then(FileFailure::kind),
            Some(FailureKind::FetchFailed)
        );
        assert_eq!(
            result.failure_for("store-fail.txt").and_then(FileFailure::kind),
            Some(FailureKind::StoreFailed)
        );
        assert!(fx.store.contains("demo", "ok1.txt"));
        assert!(fx.store.contains("demo", "ok2.txt"));

        // A failed fetch never reaches the store.
        assert!(fx.store.calls_for("fetch-fail.txt").is_empty());

        let err = result.into_verdict().unwrap_err();
        assert_eq!(err.to_string(), "2 of 5 files failed for commit c0ffee");
        assert_eq!(err.result().map(|r| r.failed_count()), Some(2));
    }

    #[tokio::test]
    async fn test_sibling_success_despite_fetch_failure() {
        let fx = Fixture::new();
        let a = fx.blob("a.txt", b"a");
        let b = fx.blob("b.txt", b"b");
        fx.source.fail_blob("blob-a.txt");

        let set = change_set(vec![
            ChangeRecord::added("a.txt", a),
            ChangeRecord::added("b.txt", b),
        ]);
        let result = fx
            .reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap();

        assert_eq!(result.failed_count(), 1);
        assert!(result.failure_for("a.txt").is_some());
        assert!(result.failure_for("b.txt").is_none());
        assert!(fx.store.contains("demo", "b.txt"));
    }

    #[tokio::test]
    async fn test_empty_change_set_issues_no_operations() {
        let fx = Fixture::new();
        let set = change_set(vec![]);

        let err = fx
            .reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::NoChanges { ref commit_id } if commit_id == "c0ffee"));
        assert!(fx.store.calls().is_empty());
        assert_eq!(fx.source.blob_requests(), 0);
    }

    #[tokio::test]
    async fn test_media_types_follow_paths() {
        let fx = Fixture::new();
        let txt = fx.blob("a.txt", b"hello");
        let png = fx.blob("img/logo.png", &[0x89, b'P', b'N', b'G', 0xff]);

        let set = change_set(vec![
            ChangeRecord::added("a.txt", txt),
            ChangeRecord::added("img/logo.png", png),
        ]);
        fx.reconciler()
            .reconcile(&set, &DestinationPolicy::unsuffixed())
            .await
            .unwrap();

        let txt = fx.store.get("demo", "a.txt").unwrap();
        assert_eq!(txt.media_type, "text/plain");
        assert_eq!(txt.body, Bytes::from_static(b"hello"));

        let png = fx.store.get("demo", "img/logo.png").unwrap();
        assert_eq!(png.media_type, "image/png");
        assert_eq!(png.body, Bytes::from_static(&[0x89, b'P', b'N', b'G', 0xff]));
    }

    async fn run_end_to_end(policy: DestinationPolicy) -> (Fixture, ReconciliationResult) {
        let fx = Fixture::new();
        let a = fx.blob("a.txt", b"a");
        let b = fx.blob("new/b.js", b"b");

        let set = change_set(vec![
            ChangeRecord::added("a.txt", a),
            ChangeRecord::renamed("old/b.js", "new/b.js", b),
            ChangeRecord::removed("c.png"),
        ]);
        let result = fx.reconciler().reconcile(&set, &policy).await.unwrap();
        (fx, result)
    }

    fn sorted_ops(calls: &[StoreCall]) -> Vec<(&'static str, String, String)> {
        let mut ops: Vec<_> = calls
            .iter()
            .map(|c| {
                let kind = if c.is_put() { "put" } else { "delete" };
                (kind, c.bucket().to_string(), c.key().to_string())
            })
            .collect();
        ops.sort();
        ops
    }

    #[tokio::test]
    async fn test_end_to_end_bare_bucket() {
        let (fx, result) = run_end_to_end(DestinationPolicy::unsuffixed()).await;

        assert_eq!(result.bucket, "demo");
        assert_eq!(result.total_files, 3);
        assert!(result.is_success());
        assert_eq!(
            sorted_ops(&fx.store.calls()),
            vec![
                ("delete", "demo".to_string(), "c.png".to_string()),
                ("delete", "demo".to_string(), "old/b.js".to_string()),
                ("put", "demo".to_string(), "a.txt".to_string()),
                ("put", "demo".to_string(), "new/b.js".to_string()),
            ]
        );
        let b_calls = fx.store.calls_for("old/b.js");
        assert_eq!(b_calls.len(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_suffixed_bucket() {
        let policy = DestinationPolicy::new(Arc::new(
            SuffixedRepositories::new().with_repository("demo"),
        ));
        let (fx, result) = run_end_to_end(policy).await;

        assert_eq!(result.bucket, "demo-prod");
        assert!(result.is_success());
        assert!(fx.store.calls().iter().all(|c| c.bucket() == "demo-prod"));
        assert_eq!(fx.store.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_fan_out_is_bounded() {
        let fx = Fixture::with_store(MemoryObjectStore::new().with_latency(Duration::from_millis(20)));
        let records: Vec<_> = (0..10)
            .map(|i| ChangeRecord::removed(format!("f{}.txt", i)))
            .collect();
        let set = change_set(records);

        let result = fx
            .reconciler()
            .with_max_concurrent_files(Some(3))
            .reconcile_into(&set, "demo")
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(fx.store.calls().len(), 10);
        assert!(fx.store.peak_in_flight() <= 3);
        assert!(fx.store.peak_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_unbounded_fan_out_runs_all_files_together() {
        let fx = Fixture::with_store(MemoryObjectStore::new().with_latency(Duration::from_millis(20)));
        let records: Vec<_> = (0..8)
            .map(|i| ChangeRecord::removed(format!("f{}.txt", i)))
            .collect();
        let set = change_set(records);

        fx.reconciler()
            .with_max_concurrent_files(None)
            .reconcile_into(&set, "demo")
            .await
            .unwrap();

        assert_eq!(fx.store.peak_in_flight(), 8);
    }

    /// Serves fixed content for every path except the ones it is told to fail.
    struct CannedResolver {
        failing_path: &'static str,
    }

    #[async_trait]
    impl ContentResolver for CannedResolver {
        async fn resolve(&self, content: &ContentRef) -> crate::content::Result<ResolvedContent> {
            if content.path == self.failing_path {
                Err(ContentError::FetchFailed {
                    path: content.path.clone(),
                    source: SourceControlError::Other("unreachable".to_string()),
                })
            } else {
                Ok(to_resolved(&content.path, b"canned".to_vec()))
            }
        }
    }

    #[tokio::test]
    async fn test_injected_resolver() {
        let store = Arc::new(MemoryObjectStore::new());
        let reconciler = Reconciler::new(
            Arc::new(CannedResolver {
                failing_path: "broken.css",
            }),
            store.clone(),
        );

        let set = change_set(vec![
            ChangeRecord::added("site.css", content_ref("site.css", "x")),
            ChangeRecord::added("broken.css", content_ref("broken.css", "y")),
        ]);
        let result = reconciler.reconcile_into(&set, "demo").await.unwrap();

        assert_eq!(result.failed_count(), 1);
        assert_eq!(store.get("demo", "site.css").unwrap().media_type, "text/css");
        assert!(store.calls_for("broken.css").is_empty());
    }
}
