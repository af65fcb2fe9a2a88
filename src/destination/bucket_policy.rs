//! Bucket name resolution.
//!
//! Every repository is mirrored into a bucket named after it. A deployment may
//! opt individual repositories into branch-suffixed buckets
//! (`<repository>-<suffix>`) through a [`BucketPolicy`].

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::branch_classifier::classify;

/// Decides which repositories get a branch-suffixed bucket.
pub trait BucketPolicy: Send + Sync {
    /// Returns true if pushes to `repository` go to `<repository>-<suffix>`.
    fn use_suffix(&self, repository: &str) -> bool;
}

impl<F> BucketPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn use_suffix(&self, repository: &str) -> bool {
        self(repository)
    }
}

/// A [`BucketPolicy`] backed by an explicit set of repository names.
#[derive(Debug, Clone, Default)]
pub struct SuffixedRepositories {
    names: HashSet<String>,
}

impl SuffixedRepositories {
    /// Create a policy that suffixes none of the repositories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a repository that should use a suffixed bucket.
    pub fn with_repository(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }
}

impl<S: Into<String>> FromIterator<S> for SuffixedRepositories {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl BucketPolicy for SuffixedRepositories {
    fn use_suffix(&self, repository: &str) -> bool {
        self.names.contains(repository)
    }
}

/// The bucket resolved for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// Bucket name that objects are written to.
    pub name: String,
    /// Suffix the ref classified to, whether or not it was applied.
    pub suffix: String,
}

/// Resolves destination buckets for pushes.
#[derive(Clone)]
pub struct DestinationPolicy {
    policy: Arc<dyn BucketPolicy>,
}

impl DestinationPolicy {
    pub fn new(policy: Arc<dyn BucketPolicy>) -> Self {
        Self { policy }
    }

    /// A policy that always uses the bare repository name.
    pub fn unsuffixed() -> Self {
        Self::new(Arc::new(SuffixedRepositories::new()))
    }

    /// Resolve the bucket for a push of `git_ref` to `repository`.
    ///
    /// A ref that classifies to an empty suffix never produces a suffixed name.
    pub fn resolve(&self, repository: &str, git_ref: &str) -> Bucket {
        let suffix = classify(git_ref);
        let name = if !suffix.is_empty() && self.policy.use_suffix(repository) {
            format!("{}-{}", repository, suffix)
        } else {
            repository.to_string()
        };
        Bucket { name, suffix }
    }
}

impl std::fmt::Debug for DestinationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationPolicy").finish_non_exhaustive()
    }
}
