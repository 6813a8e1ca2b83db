//! Error types for `simfm-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. The orchestrator folds
//! every error into one of the user-facing [`MessageCode`]s via
//! [`CoreError::message_code`].

use std::path::PathBuf;

use crate::message::MessageCode;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The object does not exist (or no longer exists) in its backend.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A folder was expected but the object is a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A file or folder name is invalid (empty, contains path separators, etc.).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The paste destination is the clipboard object itself, or lies inside it.
    #[error("the destination folder is the source folder")]
    DestinationIsSource,

    /// The operation is not available on this object (e.g. the drive list).
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A simulated snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps an I/O error on `path` to the most specific variant.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.into()),
            _ => CoreError::Io(err),
        }
    }

    /// Returns the user-facing category this error is reported under.
    pub fn message_code(&self) -> MessageCode {
        match self {
            CoreError::PermissionDenied(_) => MessageCode::RestrictedAccess,
            CoreError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                MessageCode::RestrictedAccess
            }
            CoreError::DestinationIsSource => MessageCode::DestinationIsSource,
            CoreError::Unsupported(_) => MessageCode::UnsupportedOperation,
            _ => MessageCode::UnknownError,
        }
    }
}

/// Convenience alias used throughout `simfm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
