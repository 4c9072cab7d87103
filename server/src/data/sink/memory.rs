//! In-memory sink

use parking_lot::Mutex;

use super::MetricSink;
use crate::data::types::MetricLog;

/// Collects every emitted log in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    logs: Mutex<Vec<MetricLog>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn logs(&self) -> Vec<MetricLog> {
        self.logs.lock().clone()
    }

    /// Remove and return everything emitted so far
    pub fn take(&self) -> Vec<MetricLog> {
        std::mem::take(&mut *self.logs.lock())
    }

    pub fn len(&self) -> usize {
        self.logs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.lock().is_empty()
    }
}

impl MetricSink for MemorySink {
    fn emit(&self, log: MetricLog) {
        self.logs.lock().push(log);
    }
}
