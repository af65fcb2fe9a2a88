//! Commit reconciliation: change records in, store operations out.

mod engine;
mod error;
mod plan;
mod result;

pub use engine::{DEFAULT_MAX_CONCURRENT_FILES, Reconciler};
pub use error::{ReconcileError, Result};
pub use plan::{OpKind, OperationPlan, StoreOp};
pub use result::{FailureKind, FileFailure, ReconciliationResult, StepFailure};
