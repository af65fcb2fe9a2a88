//! Commit change-set types.

use serde::Serialize;

/// Everything needed to fetch one file's content at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentRef {
    pub owner: String,
    pub repository: String,
    /// Path of the file in the commit's tree, used for media type inference.
    pub path: String,
    /// Blob id of the file content.
    pub blob_sha: String,
}

/// How a file changed in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Removed => "removed",
            ChangeStatus::Renamed => "renamed",
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of change, carrying exactly the data each kind needs.
///
/// A previous path exists only for renames and content exists for everything
/// but removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added { content: ContentRef },
    Modified { content: ContentRef },
    Removed,
    Renamed { previous_path: String, content: ContentRef },
}

/// One entry in a commit's file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    path: String,
    change: Change,
}

impl ChangeRecord {
    pub fn added(path: impl Into<String>, content: ContentRef) -> Self {
        Self {
            path: path.into(),
            change: Change::Added { content },
        }
    }

    pub fn modified(path: impl Into<String>, content: ContentRef) -> Self {
        Self {
            path: path.into(),
            change: Change::Modified { content },
        }
    }

    pub fn removed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change: Change::Removed,
        }
    }

    pub fn renamed(
        previous_path: impl Into<String>,
        path: impl Into<String>,
        content: ContentRef,
    ) -> Self {
        Self {
            path: path.into(),
            change: Change::Renamed {
                previous_path: previous_path.into(),
                content,
            },
        }
    }

    /// Current path of the file.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    pub fn status(&self) -> ChangeStatus {
        match self.change {
            Change::Added { .. } => ChangeStatus::Added,
            Change::Modified { .. } => ChangeStatus::Modified,
            Change::Removed => ChangeStatus::Removed,
            Change::Renamed { .. } => ChangeStatus::Renamed,
        }
    }

    /// Path before a rename; `None` for every other status.
    pub fn previous_path(&self) -> Option<&str> {
        match &self.change {
            Change::Renamed { previous_path, .. } => Some(previous_path),
            _ => None,
        }
    }

    /// Content handle; `None` for removals.
    pub fn content_ref(&self) -> Option<&ContentRef> {
        match &self.change {
            Change::Added { content }
            | Change::Modified { content }
            | Change::Renamed { content, .. } => Some(content),
            Change::Removed => None,
        }
    }
}

/// The file changes of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitChangeSet {
    pub repository: String,
    pub commit_id: String,
    /// Ref the commit was pushed to, when known.
    pub git_ref: Option<String>,
    /// Web URL of the commit, when the source control provides one.
    pub html_url: Option<String>,
    pub records: Vec<ChangeRecord>,
}

impl CommitChangeSet {
    pub fn new(
        repository: impl Into<String>,
        commit_id: impl Into<String>,
        records: Vec<ChangeRecord>,
    ) -> Self {
        Self {
            repository: repository.into(),
            commit_id: commit_id.into(),
            git_ref: None,
            html_url: None,
            records,
        }
    }

    pub fn with_git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn with_html_url(mut self, html_url: impl Into<String>) -> Self {
        self.html_url = Some(html_url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
