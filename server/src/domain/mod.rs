//! Domain logic
//!
//! - `meters` - SkyWalking meter sessions and metric log conversion

pub mod meters;

pub use meters::{MeterStream, SessionError, run_session};
