use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::warn;

use crate::reading::{Reading, Tag};
use crate::value::FieldValue;

#[derive(Debug, Default)]
pub(crate) struct SubmitCounters {
    pub submitted: AtomicU64,
    pub dropped: AtomicU64,
}

/// Cloneable producer handle feeding the printer worker.
///
/// Submissions are fire-and-forget. Once the worker has stopped they are
/// counted as dropped.
#[derive(Debug, Clone)]
pub struct Submitter {
    pub(crate) tx: Sender<Reading>,
    pub(crate) counters: Arc<SubmitCounters>,
}

impl Submitter {
    /// Build a reading stamped with the current time and enqueue it.
    pub fn submit<I>(&self, measurement: impl Into<String>, value: impl Into<FieldValue>, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let tags = tags.into_iter().map(Into::into).collect();
        self.submit_reading(Reading::new(measurement, value, tags));
    }

    /// Enqueue an already built reading.
    pub fn submit_reading(&self, reading: Reading) {
        match self.tx.send(reading) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                let dropped = self.counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 {
                    warn!(measurement = err.0.measurement(), "printer stopped, dropping readings");
                }
            }
        }
    }

    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.counters.submitted.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn dropped_submissions(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }
}
