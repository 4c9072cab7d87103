//! Meter Processing
//!
//! Turns SkyWalking meter report streams into normalized metric logs:
//! - `session` - per-stream identity/timestamp carry-over and fault boundary
//! - `transform` - stateless meter to metric log conversion
//! - `histogram` - cumulative `le` bucket reconstruction

mod histogram;
mod session;
mod transform;

pub use histogram::{
    CumulativeBucket, CumulativeHistogram, LABEL_LE, SUFFIX_BUCKET, SUFFIX_COUNT, SUFFIX_SUM,
    convert_histogram,
};
pub use session::{
    BatchStream, MeterStream, SessionError, SessionState, SessionStats, run_session,
};
pub use transform::{LABEL_SERVICE, LABEL_SERVICE_INSTANCE, MeterContext, transform_meter};
