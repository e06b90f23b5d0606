use thiserror::Error;

/// Errors raised while resolving targets, compressors, commands and configuration.
///
/// Per-file deletion problems are not errors: they are collected as
/// [`crate::DeletionFailure`] records in the cleanup report.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Command `{command}` failed (exit code {exit_code:?}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
