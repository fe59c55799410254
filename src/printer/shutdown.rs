use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver, Sender};

/// Cancellation token for the printer worker.
///
/// Cancelling closes an internal channel, so a worker blocked in `select!`
/// wakes up immediately instead of polling. Clones share the same state.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
    tx: Arc<Mutex<Option<Sender<()>>>>,
    rx: Receiver<()>,
}

impl ShutdownToken {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            tx: Arc::new(Mutex::new(Some(tx))),
            rx,
        }
    }

    /// Request shutdown. Idempotent.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        // A poisoned lock still holds the sender; dropping it is all we need.
        let mut guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Becomes disconnected once the token is cancelled, for use in `select!`.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}
