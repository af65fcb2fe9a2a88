//! Push event handling.
//!
//! A [`Handler`] turns one push into a mirror run: classify the ref, pick the
//! bucket, fetch the commit's change set, reconcile it into the bucket and,
//! when every file landed, publish a completion notice.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::app::Result;
use crate::content::SourceControlResolver;
use crate::destination::{DestinationPolicy, classify};
use crate::event::{Envelope, PushEvent};
use crate::notify::{Notifier, completion_message};
use crate::object_store::ObjectStore;
use crate::reconcile::{ReconcileError, ReconciliationResult, Reconciler};
use crate::source_control::SourceControl;

/// Default subject of completion notices.
pub const DEFAULT_SUBJECT: &str = "Transfer complete.";

/// What a handled event amounted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Not a push; nothing was done.
    Ignored { event_type: Option<String> },
    /// Every file of the commit was mirrored and the completion notice sent.
    Completed {
        summary: String,
        suffix: String,
        result: ReconciliationResult,
    },
}

/// Mirrors pushed commits into the object store.
pub struct Handler {
    source: Arc<dyn SourceControl>,
    reconciler: Reconciler,
    destination: DestinationPolicy,
    notifier: Arc<dyn Notifier>,
    owner: Option<String>,
    subject: String,
}

impl Handler {
    pub fn new(
        source: Arc<dyn SourceControl>,
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let resolver = Arc::new(SourceControlResolver::new(source.clone()));
        Self {
            source,
            reconciler: Reconciler::new(resolver, store),
            destination: DestinationPolicy::unsuffixed(),
            notifier,
            owner: None,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    pub fn with_destination(mut self, destination: DestinationPolicy) -> Self {
        self.destination = destination;
        self
    }

    /// Fix the repository owner instead of taking it from each push.
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_max_concurrent_files(mut self, limit: Option<usize>) -> Self {
        self.reconciler = self.reconciler.with_max_concurrent_files(limit);
        self
    }

    /// Handle one inbound envelope. Anything but a push is ignored.
    pub async fn handle(&self, envelope: &Envelope) -> Result<Outcome> {
        info!(
            event_type = envelope.event_type().unwrap_or("<none>"),
            "received event"
        );
        let Some(push) = envelope.push_event()? else {
            info!("ignoring non-push event");
            return Ok(Outcome::Ignored {
                event_type: envelope.event_type().map(str::to_string),
            });
        };
        self.replay(&push).await
    }

    /// Mirror the head commit of `push`.
    pub async fn replay(&self, push: &PushEvent) -> Result<Outcome> {
        let owner = self.owner.as_deref().unwrap_or(&push.owner);
        let suffix = classify(&push.git_ref);
        let bucket = self.destination.resolve(&push.repository, &push.git_ref);
        info!(
            owner,
            repository = %push.repository,
            git_ref = %push.git_ref,
            suffix = %suffix,
            bucket = %bucket.name,
            commit = %push.head_commit,
            "mirroring push"
        );

        let change_set = self
            .source
            .get_commit(owner, &push.repository, &push.head_commit)
            .await
            .map_err(|source| {
                warn!(commit = %push.head_commit, error = %source, "commit lookup failed");
                ReconcileError::CommitLookupFailed {
                    sha: push.head_commit.clone(),
                    source,
                }
            })?;
        let change_set = change_set.with_git_ref(&push.git_ref);

        let result = self
            .reconciler
            .reconcile_into(&change_set, &bucket.name)
            .await?
            .into_verdict()?;

        let summary = completion_message(owner, &push.repository, &suffix, &push.head_commit);
        self.notifier.notify(&self.subject, &summary).await?;
        info!(summary = %summary, "mirror complete");

        Ok(Outcome::Completed {
            summary,
            suffix,
            result,
        })
    }
}
