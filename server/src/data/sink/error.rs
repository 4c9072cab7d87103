//! Sink error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize metric log: {0}")]
    Serialize(#[from] serde_json::Error),
}
