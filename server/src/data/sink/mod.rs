//! Metric sinks
//!
//! Sessions hand every emitted [`MetricLog`] to a [`MetricSink`]. Emission is
//! fire-and-forget: a sink must never block the calling session.
//!
//! - `ChannelSink` - bounded queue drained by a `SinkWriter` task (stdout / file)
//! - `MemorySink` - in-process buffer, for tests and embedding

mod channel;
mod error;
mod memory;
mod writer;

pub use channel::{ChannelSink, channel};
pub use error::SinkError;
pub use memory::MemorySink;
pub use writer::{SinkTarget, SinkWriter};

use crate::data::types::MetricLog;

/// Destination for emitted metric logs. Shared by all sessions.
pub trait MetricSink: Send + Sync {
    fn emit(&self, log: MetricLog);
}

impl<T: MetricSink + ?Sized> MetricSink for std::sync::Arc<T> {
    fn emit(&self, log: MetricLog) {
        (**self).emit(log)
    }
}
