//! Bounding the number of concurrently running per-file operations.
//!
//! A [`FanOutLimit`] hands out [`FanOutPermit`]s up to a fixed limit. Callers
//! beyond the limit wait in FIFO order; dropping a permit passes its slot to
//! the next waiter.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

struct Slots {
    limit: usize,
    in_use: usize,
    waiters: VecDeque<oneshot::Sender<()>>,
}

struct Inner {
    slots: Mutex<Slots>,
}

impl Inner {
    fn try_take(&self) -> bool {
        let mut slots = self.slots.lock().unwrap();
        if slots.in_use < slots.limit {
            slots.in_use += 1;
            true
        } else {
            false
        }
    }

    fn enqueue(&self) -> Option<oneshot::Receiver<()>> {
        let mut slots = self.slots.lock().unwrap();
        // A slot may have been released between try_take and here.
        if slots.in_use < slots.limit {
            slots.in_use += 1;
            return None;
        }
        let (sender, receiver) = oneshot::channel();
        slots.waiters.push_back(sender);
        Some(receiver)
    }

    fn release(&self) {
        let mut slots = self.slots.lock().unwrap();
        // Hand the slot straight to the oldest live waiter.
        while let Some(waiter) = slots.waiters.pop_front() {
            if waiter.send(()).is_ok() {
                return;
            }
        }
        slots.in_use = slots.in_use.saturating_sub(1);
    }
}

/// A slot held by one running operation; released on drop.
pub struct FanOutPermit {
    inner: Arc<Inner>,
}

impl Drop for FanOutPermit {
    fn drop(&mut self) {
        self.inner.release();
    }
}

/// A FIFO limit on concurrently running operations.
///
/// Clones share the same slots.
#[derive(Clone)]
pub struct FanOutLimit {
    inner: Arc<Inner>,
}

impl FanOutLimit {
    /// Create a limit allowing `limit` concurrent permits.
    ///
    /// A limit of zero is raised to one so that callers always make progress.
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Slots {
                    limit: limit.max(1),
                    in_use: 0,
                    waiters: VecDeque::new(),
                }),
            }),
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> FanOutPermit {
        if !self.inner.try_take()
            && let Some(receiver) = self.inner.enqueue()
        {
            // The sender is only dropped together with the limit itself.
            let _ = receiver.await;
        }
        FanOutPermit {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn limit(&self) -> usize {
        self.inner.slots.lock().unwrap().limit
    }

    /// Number of permits currently held.
    pub fn in_use(&self) -> usize {
        self.inner.slots.lock().unwrap().in_use
    }

    /// Number of callers waiting for a slot.
    pub fn waiting_count(&self) -> usize {
        self.inner.slots.lock().unwrap().waiters.len()
    }
}

impl std::fmt::Debug for FanOutLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutLimit")
            .field("limit", &self.limit())
            .field("in_use", &self.in_use())
            .finish()
    }
}
