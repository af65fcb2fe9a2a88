//! Source control access: commit change lists and blob content.

mod error;
mod github_source_control;
mod memory_source_control;
#[allow(clippy::module_inception)]
mod source_control;
mod types;

pub use error::{Result, SourceControlError};
pub use github_source_control::{DEFAULT_API_URL, GithubSourceControl, GithubSourceControlConfig};
pub use memory_source_control::MemorySourceControl;
pub use source_control::SourceControl;
pub use types::{Change, ChangeRecord, ChangeStatus, CommitChangeSet, ContentRef};
