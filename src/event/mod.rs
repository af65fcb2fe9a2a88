//! Inbound push events.

mod envelope;
mod error;

pub use envelope::{EVENT_TYPE_ATTRIBUTE, Envelope, PUSH_EVENT, PushEvent, parse_envelope};
pub use error::{EventError, Result};
