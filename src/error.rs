//! Error types for batch-unpack
//!
//! The taxonomy follows how the processor treats each failure:
//! - configuration and target-directory errors are fatal before any mutation
//! - an extraction timeout is recoverable for the single target it hit
//! - every other extraction, I/O, or file operation error aborts the run

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for batch-unpack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for batch-unpack
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "folder_range")
        key: Option<String>,
    },

    /// The directory given on the command line cannot be processed
    #[error("invalid target directory {path}: {reason}")]
    InvalidTarget {
        /// The path as supplied by the user
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// Archive extraction error
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// A delete, move, or rename step failed
    #[error("file operation failed on {path}: {reason}")]
    FileOperation {
        /// The path the operation was applied to
        path: PathBuf,
        /// The reason the operation failed
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool execution failed (could not be spawned)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary)
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Errors raised while running the external extraction binary
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The extraction process ran longer than the configured timeout and was killed
    #[error("extraction of {archive} timed out after {timeout:?}")]
    Timeout {
        /// The archive (or first volume) being extracted
        archive: PathBuf,
        /// The timeout that was exceeded
        timeout: Duration,
    },

    /// The extraction binary exited unsuccessfully (wrong password, corrupt archive, ...)
    #[error("extraction failed for {archive}: {reason}")]
    Failed {
        /// The archive that failed to extract
        archive: PathBuf,
        /// Diagnostic output of the extraction tool
        reason: String,
    },
}

impl Error {
    /// Whether this error is an extraction timeout, the only per-target recoverable failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Extraction(ExtractionError::Timeout { .. }))
    }

    /// Short machine-readable code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidTarget { .. } => "invalid_target",
            Error::Extraction(ExtractionError::Timeout { .. }) => "extraction_timeout",
            Error::Extraction(ExtractionError::Failed { .. }) => "extraction_failed",
            Error::FileOperation { .. } => "file_operation_failed",
            Error::Io(_) => "io_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
        }
    }

    /// Build a [`Error::FileOperation`] from an I/O error on `path`
    pub(crate) fn file_op(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Error::FileOperation {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
