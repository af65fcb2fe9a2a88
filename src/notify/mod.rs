//! Completion notifications.

mod log_notifier;
mod memory_notifier;
mod notifier;
mod sns_notifier;

pub use log_notifier::LogNotifier;
pub use memory_notifier::{MemoryNotifier, Notification};
pub use notifier::{Notifier, NotifyError, Result, completion_message};
pub use sns_notifier::{SnsNotifier, SnsNotifierConfig};
