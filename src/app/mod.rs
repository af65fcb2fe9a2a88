//! Application-level wiring.

#[allow(clippy::module_inception)]
mod app;
mod handler;

pub use app::{App, AppContext, AppError, Result};
pub use handler::{DEFAULT_SUBJECT, Handler, Outcome};
