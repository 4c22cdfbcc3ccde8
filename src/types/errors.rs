//! Error types used by adapters and collaborators.
use thiserror::Error;

/// High-level error categories for adapter operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("io error")]
    Io,
    #[error("storage error")]
    Storage,
    #[error("not found")]
    NotFound,
    #[error("policy violation")]
    Policy,
}

/// Structured error with a kind and human message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        let kind = match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Io,
        };
        Self {
            kind,
            msg: e.to_string(),
        }
    }
}

/// Error surfaced by an `ActionExecutor` while mutating storage.
pub type ExecutorError = Error;

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;
