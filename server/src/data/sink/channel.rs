//! Bounded channel sink

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::MetricSink;
use crate::data::types::MetricLog;

/// Log a drop warning on the first drop and then once per this many drops
const DROP_WARN_INTERVAL: u64 = 1000;

/// Create a bounded channel sink and the receiver a `SinkWriter` drains
pub fn channel(capacity: usize) -> (ChannelSink, mpsc::Receiver<MetricLog>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ChannelSink {
            tx,
            dropped: AtomicU64::new(0),
        },
        rx,
    )
}

/// Sink that queues logs without blocking. Logs are dropped when the queue is
/// full or the writer has stopped.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<MetricLog>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// Number of logs dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record_drop(&self, reason: &'static str) {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if dropped % DROP_WARN_INTERVAL == 1 {
            tracing::warn!(dropped, reason, "Dropping metric logs");
        }
    }
}

impl MetricSink for ChannelSink {
    fn emit(&self, log: MetricLog) {
        match self.tx.try_send(log) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.record_drop("sink buffer full"),
            Err(TrySendError::Closed(_)) => self.record_drop("sink closed"),
        }
    }
}
