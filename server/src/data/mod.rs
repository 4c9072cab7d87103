//! Data layer
//!
//! - `types` - Metric log record shared by sessions and sinks
//! - `sink` - Destinations for emitted metric logs

pub mod sink;
pub mod types;
