use std::sync::Mutex;

use async_trait::async_trait;

use super::notifier::{Notifier, NotifyError, Result};

/// A published notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub message: String,
}

/// An in-memory implementation of [`Notifier`], intended primarily for testing.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every publish fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Notifications published so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, subject: &str, message: &str) -> Result<()> {
        if self.fail {
            return Err(NotifyError::PublishFailed {
                topic: "memory".to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.sent.lock().unwrap().push(Notification {
            subject: subject.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify("one", "first").await.unwrap();
        notifier.notify("two", "second").await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, "one");
        assert_eq!(sent[1].message, "second");
    }

    #[tokio::test]
    async fn test_failing() {
        let notifier = MemoryNotifier::failing();
        assert!(notifier.notify("s", "m").await.is_err());
        assert!(notifier.sent().is_empty());
    }
}
