//! git2s3 - mirror the file changes of a pushed commit into an object store bucket.

pub mod app;
pub mod cli;
pub mod config;
pub mod content;
pub mod destination;
pub mod event;
pub mod notify;
pub mod object_store;
pub mod reconcile;
pub mod source_control;
pub mod util;

pub use app::{App, AppContext, AppError, Handler, Outcome};
pub use destination::{DestinationPolicy, classify};
pub use reconcile::{ReconcileError, ReconciliationResult, Reconciler};
