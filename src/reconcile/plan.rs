//! Per-file operation plans.

use serde::Serialize;

use crate::source_control::{Change, ChangeRecord, ContentRef};

/// Kind of store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Put,
    Delete,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Put => f.write_str("put"),
            OpKind::Delete => f.write_str("delete"),
        }
    }
}

/// One store operation in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp<'a> {
    /// Remove the object at `key`.
    Delete { key: &'a str },
    /// Resolve `content` and write it to `key`.
    Put { key: &'a str, content: &'a ContentRef },
}

impl StoreOp<'_> {
    pub fn kind(&self) -> OpKind {
        match self {
            StoreOp::Delete { .. } => OpKind::Delete,
            StoreOp::Put { .. } => OpKind::Put,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StoreOp::Delete { key } | StoreOp::Put { key, .. } => key,
        }
    }
}

/// The ordered store operations for one change record.
///
/// | status   | plan                                 |
/// |----------|--------------------------------------|
/// | added    | put(path)                            |
/// | modified | put(path)                            |
/// | removed  | delete(path)                         |
/// | renamed  | delete(previous path), put(path)     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPlan<'a> {
    ops: Vec<StoreOp<'a>>,
}

impl<'a> OperationPlan<'a> {
    pub fn for_record(record: &'a ChangeRecord) -> Self {
        let key = record.path();
        let ops = match record.change() {
            Change::Added { content } | Change::Modified { content } => {
                vec![StoreOp::Put { key, content }]
            }
            Change::Removed => vec![StoreOp::Delete { key }],
            Change::Renamed {
                previous_path,
                content,
            } => vec![
                StoreOp::Delete { key: previous_path },
                StoreOp::Put { key, content },
            ],
        };
        Self { ops }
    }

    /// Operations in execution order.
    pub fn ops(&self) -> &[StoreOp<'a>] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<'a> IntoIterator for OperationPlan<'a> {
    type Item = StoreOp<'a>;
    type IntoIter = std::vec::IntoIter<StoreOp<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
