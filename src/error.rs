use std::{io, path::PathBuf};

/// Errors that can occur when using the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Invalid granularity '{0}': expected one of M, H, D, W")]
    InvalidGranularity(String),
    #[error("Invalid log level '{0}': expected one of DEBUG, INFO, WARN, ERROR")]
    InvalidLevel(String),
    #[error("Invalid file name pattern: {0}")]
    InvalidPattern(String),
    #[error("Failed to create directory '{0}': {1}")]
    CreateDirectoryFailed(PathBuf, String),
    #[error("Failed to create file '{0}': {1}")]
    CreateFileFailed(PathBuf, String),
    #[error("Failed to set file permissions for '{path}': {error}")]
    SetFilePermissionsError { path: PathBuf, error: String },
    #[error("Failed to write to '{0}': {1}")]
    WriteFailed(PathBuf, #[source] io::Error),
    #[error("Failed to close '{0}': {1}")]
    CloseFailed(PathBuf, #[source] io::Error),
    #[error("Failed to compress '{0}': {1}")]
    CompressFailed(PathBuf, #[source] io::Error),
    #[error("File IO error: {0}")]
    FileIOError(#[from] io::Error),
    #[error("Logger is closed")]
    Closed,
    #[error("Logger writer stopped after a fatal error")]
    WriterStopped,
    #[error("Logger writer thread panicked")]
    WriterPanicked,
}

impl LoggerError {
    /// Process exit status an application can use when it decides to
    /// terminate on this error.
    ///
    /// * `2` - configuration error
    /// * `3` - the log file could not be opened
    /// * `4` - a record could not be written
    /// * `5` - the log file could not be closed
    /// * `1` - anything else
    pub fn exit_code(&self) -> i32 {
        match self {
            LoggerError::InvalidGranularity(_) | LoggerError::InvalidLevel(_) | LoggerError::InvalidPattern(_) => 2,
            LoggerError::CreateDirectoryFailed(..)
            | LoggerError::CreateFileFailed(..)
            | LoggerError::SetFilePermissionsError { .. } => 3,
            LoggerError::WriteFailed(..) => 4,
            LoggerError::CloseFailed(..) => 5,
            LoggerError::CompressFailed(..)
            | LoggerError::FileIOError(_)
            | LoggerError::Closed
            | LoggerError::WriterStopped
            | LoggerError::WriterPanicked => 1,
        }
    }
}
