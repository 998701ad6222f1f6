//! Error types for pathmux

use std::io;
use thiserror::Error;

/// Result type alias
pub type PmxResult<T> = Result<T, PmxError>;

/// Main error type
#[derive(Error, Debug)]
pub enum PmxError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Directory not empty: {0}")]
    NotEmpty(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Paths resolve to different backends: {from} -> {to}")]
    BackendMismatch { from: String, to: String },

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Parent of {0} resolves back onto itself")]
    MalformedParent(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PmxError {
    /// Map an I/O error raised while operating on `path` onto the error
    /// vocabulary, keeping the raw error for kinds without a counterpart.
    pub fn from_io(err: io::Error, path: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => PmxError::NotFound(path.to_string()),
            io::ErrorKind::AlreadyExists => PmxError::AlreadyExists(path.to_string()),
            io::ErrorKind::PermissionDenied => PmxError::PermissionDenied(path.to_string()),
            io::ErrorKind::DirectoryNotEmpty => PmxError::NotEmpty(path.to_string()),
            io::ErrorKind::NotADirectory => PmxError::NotADirectory(path.to_string()),
            io::ErrorKind::IsADirectory => PmxError::NotAFile(path.to_string()),
            _ => PmxError::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PmxError::NotFound(_))
    }

    /// Errors caused by how the registry was assembled rather than by I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(self, PmxError::Config(_) | PmxError::MalformedParent(_))
    }
}
