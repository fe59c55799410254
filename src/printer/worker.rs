//! The single consumer: drains readings, aggregates them, writes lines.

use std::io::Write;

use crossbeam_channel::{select, Receiver};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::aggregator::{Aggregator, AggregatorStats};
use crate::error::PrinterError;
use crate::line_protocol::LineFormatter;
use crate::reading::Reading;

use super::shutdown::ShutdownToken;

/// What the worker saw over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub aggregator: AggregatorStats,
    pub lines_written: u64,
    pub write_errors: u64,
}

/// Result of one blocking dequeue.
#[derive(Debug)]
pub(crate) enum Dequeued {
    Reading(Reading),
    Shutdown,
}

pub(crate) fn dequeue(rx: &Receiver<Reading>, shutdown: &ShutdownToken) -> Dequeued {
    if shutdown.is_cancelled() {
        return Dequeued::Shutdown;
    }

    select! {
        recv(shutdown.receiver()) -> _ => Dequeued::Shutdown,
        recv(rx) -> msg => match msg {
            Ok(reading) => Dequeued::Reading(reading),
            // Every producer handle is gone and the queue is drained.
            Err(_) => Dequeued::Shutdown,
        },
    }
}

pub(crate) fn worker_loop(
    mut aggregator: Aggregator,
    formatter: LineFormatter,
    mut sink: Box<dyn Write + Send>,
    rx: Receiver<Reading>,
    shutdown: ShutdownToken,
) -> WorkerStats {
    info!(trigger = aggregator.trigger(), prefix = formatter.prefix(), "printer worker started");

    let mut stats = WorkerStats::default();

    while let Dequeued::Reading(reading) = dequeue(&rx, &shutdown) {
        let Some(record) = aggregator.ingest(reading) else {
            continue;
        };

        let written = formatter
            .write_record(&mut sink, &record)
            .and_then(|n| sink.flush().map(|()| n));
        match written {
            Ok(n) => stats.lines_written += n as u64,
            Err(err) => {
                // Aggregation state is not rolled back; the record is lost.
                let err = PrinterError::from(err);
                stats.write_errors += 1;
                error!(error = %err, measurement = %record.measurement, "failed to write line protocol");
            }
        }
    }

    let discarded = aggregator.clear();
    debug!(pending_groups = discarded, queued_readings = rx.len(), "discarding unflushed state");

    stats.aggregator = aggregator.stats();
    info!(
        merged = stats.aggregator.merged,
        lines = stats.lines_written,
        "printer worker stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_dequeue_prefers_cancelled_token() {
        let (tx, rx) = unbounded();
        tx.send(Reading::new("presentValue", 1, Vec::new())).unwrap();

        let token = ShutdownToken::new();
        assert!(matches!(dequeue(&rx, &token), Dequeued::Reading(_)));

        tx.send(Reading::new("presentValue", 2, Vec::new())).unwrap();
        token.cancel();
        assert!(matches!(dequeue(&rx, &token), Dequeued::Shutdown));
    }

    #[test]
    fn test_dequeue_drains_before_disconnect() {
        let (tx, rx) = unbounded();
        tx.send(Reading::new("units", "degF", Vec::new())).unwrap();
        drop(tx);

        let token = ShutdownToken::new();
        assert!(matches!(dequeue(&rx, &token), Dequeued::Reading(_)));
        assert!(matches!(dequeue(&rx, &token), Dequeued::Shutdown));
    }
}
