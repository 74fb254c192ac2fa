//! Crate-level error type.

use thiserror::Error;

use crate::command::{BuildError, RegistryError};

/// Result type for pipeline operations.
pub type CbkResult<T> = Result<T, CbkError>;

/// Errors surfaced to callers of the operation pipeline.
///
/// Nothing is retried: every variant propagates to the caller as-is.
#[derive(Debug, Error)]
pub enum CbkError {
    /// The requested operation has no spec in the registry.
    #[error("unknown operation: {name}")]
    UnknownOperation {
        /// Requested operation name.
        name: String,
    },

    /// Parameters were rejected before anything was spawned.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A spec could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Starting or supervising the child process failed.
    #[cfg(feature = "executor")]
    #[error(transparent)]
    Invocation(#[from] crate::executor::InvocationError),

    /// The external tool exited with a non-zero code.
    #[error("buildah failed with exit code {exit_code}: {message}")]
    ExternalToolFailure {
        /// Exit code reported by the tool.
        exit_code: i32,
        /// Captured stderr or a description of the exit code.
        message: String,
    },
}

impl CbkError {
    /// Create an UnknownOperation error.
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation { name: name.into() }
    }

    /// Whether the error was raised before any process could be spawned.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownOperation { .. } | Self::Build(_) | Self::Registry(_)
        )
    }
}
