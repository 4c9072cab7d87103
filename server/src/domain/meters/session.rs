//! Meter report sessions
//!
//! One session per client stream. Agents only send `service`,
//! `serviceInstance` and the batch timestamp on the first message(s) of a
//! stream, so each session carries them forward in a [`SessionState`] that
//! lives exactly as long as the stream.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::{FutureExt, Stream, StreamExt};
use thiserror::Error;
use tonic::Status;

use super::transform::{MeterContext, transform_meter};
use crate::data::sink::MetricSink;
use crate::proto::{Commands, MeterData, MeterDataCollection};
use crate::utils::time::now_millis;

/// Source of meters for one session.
#[async_trait]
pub trait MeterStream: Send {
    /// Next meter, `Ok(None)` on clean end of stream
    async fn next_meter(&mut self) -> Result<Option<MeterData>, Status>;
}

#[async_trait]
impl<S> MeterStream for S
where
    S: Stream<Item = Result<MeterData, Status>> + Unpin + Send,
{
    async fn next_meter(&mut self) -> Result<Option<MeterData>, Status> {
        self.next().await.transpose()
    }
}

/// Flattens a `collectBatch` stream into its individual meters, in order
pub struct BatchStream<S> {
    inner: S,
    pending: VecDeque<MeterData>,
}

impl<S> BatchStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
        }
    }
}

#[async_trait]
impl<S> MeterStream for BatchStream<S>
where
    S: Stream<Item = Result<MeterDataCollection, Status>> + Unpin + Send,
{
    async fn next_meter(&mut self) -> Result<Option<MeterData>, Status> {
        loop {
            if let Some(meter) = self.pending.pop_front() {
                return Ok(Some(meter));
            }
            match self.inner.next().await.transpose()? {
                Some(collection) => self.pending.extend(collection.meter_data),
                None => return Ok(None),
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to receive meter: {0}")]
    Receive(#[from] Status),

    #[error("meter session panicked: {0}")]
    Panicked(String),
}

impl From<SessionError> for Status {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Receive(status) => status,
            SessionError::Panicked(msg) => {
                Status::internal(format!("meter session aborted: {}", msg))
            }
        }
    }
}

/// Carry-over state of one session
#[derive(Debug, Default)]
pub struct SessionState {
    last_timestamp: i64,
    service: String,
    service_instance: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one meter into the state and resolve its context.
    ///
    /// Returns `None` while the session identity is still incomplete; such
    /// meters are dropped (a stream picked up mid-way after a receiver
    /// restart never sees its identity message).
    pub fn observe(&mut self, meter: &MeterData) -> Option<MeterContext<'_>> {
        let timestamp_ms = self.resolve_timestamp(meter.timestamp);

        if !meter.service.is_empty() {
            self.service.clone_from(&meter.service);
        }
        if !meter.service_instance.is_empty() {
            self.service_instance.clone_from(&meter.service_instance);
        }

        if self.service.is_empty() || self.service_instance.is_empty() {
            return None;
        }

        Some(MeterContext {
            service: &self.service,
            service_instance: &self.service_instance,
            timestamp_ms,
        })
    }

    fn resolve_timestamp(&mut self, timestamp: i64) -> i64 {
        if timestamp > 0 {
            self.last_timestamp = timestamp;
            timestamp
        } else if self.last_timestamp > 0 {
            self.last_timestamp
        } else {
            now_millis()
        }
    }
}

/// Counters reported when a session ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub received: u64,
    pub dropped: u64,
    pub emitted: u64,
}

/// Run one session to completion.
///
/// A clean end of stream yields the (empty) acknowledgement. Receive errors
/// are returned as-is. A panic while processing is contained here and turned
/// into [`SessionError::Panicked`] so it only ends this session.
pub async fn run_session<S, K>(stream: S, sink: &K) -> Result<Commands, SessionError>
where
    S: MeterStream,
    K: MetricSink + ?Sized,
{
    match AssertUnwindSafe(drive_session(stream, sink))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            tracing::error!(error = %msg, "Meter session panicked, closing stream");
            Err(SessionError::Panicked(msg))
        }
    }
}

async fn drive_session<S, K>(mut stream: S, sink: &K) -> Result<Commands, SessionError>
where
    S: MeterStream,
    K: MetricSink + ?Sized,
{
    let mut state = SessionState::new();
    let mut stats = SessionStats::default();

    tracing::debug!("Meter session started");

    loop {
        let meter = match stream.next_meter().await {
            Ok(Some(meter)) => meter,
            Ok(None) => {
                tracing::debug!(
                    received = stats.received,
                    dropped = stats.dropped,
                    emitted = stats.emitted,
                    "Meter session completed"
                );
                return Ok(Commands::default());
            }
            Err(status) => {
                tracing::warn!(
                    error = %status,
                    received = stats.received,
                    "Meter session receive failed"
                );
                return Err(SessionError::Receive(status));
            }
        };
        stats.received += 1;

        let Some(ctx) = state.observe(&meter) else {
            stats.dropped += 1;
            tracing::trace!("Dropping meter received before session identity");
            continue;
        };

        for log in transform_meter(&meter, &ctx) {
            sink.emit(log);
            stats.emitted += 1;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
