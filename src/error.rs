//! Error types for timeline and media operations.
//!
//! Most conditions never reach the caller: unknown ids are no-ops and trim
//! ranges are clamped. What is left is probe failures (reported per file in
//! `AddReport`) and invalid positional arguments.

use thiserror::Error;

/// Why a media file could not be turned into a clip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("probe timed out after {0} ms")]
    Timeout(u64),
    #[error("invalid duration: {0}")]
    InvalidDuration(f64),
    #[error("unreadable media: {0}")]
    Unreadable(String),
    #[error("probe worker exited without a result")]
    Disconnected,
}

#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SequenceError>;
