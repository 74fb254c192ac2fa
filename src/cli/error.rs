//! Error types for CLI operations

use thiserror::Error;

use crate::error::CbkError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur during CLI command execution
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid argument or input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error raised by the operation pipeline
    #[error(transparent)]
    Operation(#[from] CbkError),

    /// The caller-side timeout elapsed and the operation was cancelled
    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    /// Interrupted by Ctrl-C
    #[error("interrupted")]
    Interrupted,
}

impl CliError {
    /// Process exit code for this error: `2` when nothing was spawned
    /// because the input was rejected, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigError(_) | Self::InvalidInput(_) | Self::SerdeError(_) => 2,
            Self::Operation(e) if e.is_validation() => 2,
            _ => 1,
        }
    }
}

// Conversions from common error types
impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::SerdeError(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::ConfigError(format!("{:#}", err))
    }
}
