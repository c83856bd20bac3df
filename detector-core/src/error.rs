use thiserror::Error;

/// Errors surfaced by the detection pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),
    #[error("A recording is already in progress")]
    AlreadyRecording,
    #[error("No recording in progress")]
    NotRecording,
    #[error("Recording contains no frames")]
    EmptyRecording,
    #[error("Pattern name must not be empty")]
    InvalidName,
    #[error("No audio stream has been acquired")]
    StreamUnavailable,
    #[error("Wake lock is not supported on this platform")]
    WakeLockUnsupported,
    #[error("Invalid e-mail address: {0:?}")]
    InvalidEmail(String),
    #[error("E-mail address already present: {0}")]
    DuplicateEmail(String),
    #[error("Operation not allowed while {0}")]
    Busy(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DetectorError>;
