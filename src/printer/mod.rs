//! Line protocol printer: producers submit readings, one worker prints them.
//!
//! Producers on any thread enqueue readings through [`Submitter`] handles into
//! an unbounded channel. A dedicated worker thread owns the [`Aggregator`] and
//! processes readings strictly one at a time, so the pending-group state never
//! needs locking.
//!
//! Shutdown discards pending groups without flushing them:
//! - [`Printer::shutdown`] cancels the worker at its next dequeue; readings
//!   still queued are dropped.
//! - [`Printer::close`] stops accepting readings from this handle and lets the
//!   worker drain the queue. It returns once every [`Submitter`] clone is gone.

/// Cancellation token.
pub mod shutdown;
/// Producer handle.
pub mod submitter;
/// Worker loop.
pub mod worker;

use std::io::Write;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};

use crate::aggregator::Aggregator;
use crate::config::PrinterConfig;
use crate::error::{BacnetResult, PrinterError};
use crate::line_protocol::LineFormatter;
use crate::reading::{Reading, Tag};
use crate::value::FieldValue;

pub use shutdown::ShutdownToken;
pub use submitter::Submitter;
pub use worker::WorkerStats;

use submitter::SubmitCounters;

/// Final counters of a stopped printer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterStats {
    pub submitted: u64,
    pub dropped_submissions: u64,
    pub worker: WorkerStats,
}

/// Owns the worker thread and a producer handle.
#[derive(Debug)]
pub struct Printer {
    submitter: Submitter,
    shutdown: ShutdownToken,
    join: Option<JoinHandle<WorkerStats>>,
}

impl Printer {
    /// Validate the configuration and spawn the worker writing to `sink`.
    pub fn start<W>(cfg: PrinterConfig, sink: W) -> BacnetResult<Self>
    where
        W: Write + Send + 'static,
    {
        cfg.validate()?;

        let (tx, rx) = unbounded::<Reading>();
        let shutdown = ShutdownToken::new();

        let aggregator = Aggregator::new(cfg.aggregator);
        let formatter = LineFormatter::with_prefix(cfg.prefix);
        let sink: Box<dyn Write + Send> = Box::new(sink);

        let thread_shutdown = shutdown.clone();
        let join = thread::Builder::new()
            .name(cfg.thread_name)
            .spawn(move || worker::worker_loop(aggregator, formatter, sink, rx, thread_shutdown))
            .map_err(|e| PrinterError::Spawn { message: e.to_string() })?;

        Ok(Self {
            submitter: Submitter {
                tx,
                counters: Arc::new(SubmitCounters::default()),
            },
            shutdown,
            join: Some(join),
        })
    }

    /// Build a reading stamped with the current time and enqueue it.
    pub fn submit<I>(&self, measurement: impl Into<String>, value: impl Into<FieldValue>, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        self.submitter.submit(measurement, value, tags);
    }

    /// Enqueue an already built reading.
    pub fn submit_reading(&self, reading: Reading) {
        self.submitter.submit_reading(reading);
    }

    /// A producer handle for other threads.
    #[must_use]
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Token that stops the worker when cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// Cancel the worker and wait for it.
    pub fn shutdown(mut self) -> BacnetResult<PrinterStats> {
        self.shutdown.cancel();
        self.join_worker()
    }

    /// Drain queued readings, then stop. Blocks until all submitters are dropped.
    pub fn close(mut self) -> BacnetResult<PrinterStats> {
        let (dummy_tx, _) = unbounded::<Reading>();
        let old_tx = std::mem::replace(&mut self.submitter.tx, dummy_tx);
        drop(old_tx);
        self.join_worker()
    }

    fn join_worker(&mut self) -> BacnetResult<PrinterStats> {
        let worker = match self.join.take() {
            Some(handle) => handle.join().map_err(|_| PrinterError::WorkerPanicked)?,
            None => WorkerStats::default(),
        };

        let counters = &self.submitter.counters;
        Ok(PrinterStats {
            submitted: counters.submitted.load(Ordering::Relaxed),
            dropped_submissions: counters.dropped.load(Ordering::Relaxed),
            worker,
        })
    }
}

impl Drop for Printer {
    fn drop(&mut self) {
        // Do not join: live submitters could keep the worker blocked forever.
        if self.join.is_some() {
            self.shutdown.cancel();
        }
    }
}
