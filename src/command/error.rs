//! Error types for argument building.

use thiserror::Error;

/// Errors raised while turning a parameter set into an argument vector.
///
/// All of these are input-validation errors: they are detected before any
/// process is spawned and are never retried.
///
/// # Example
///
/// ```
/// use cbk::command::BuildError;
///
/// let error = BuildError::conflicting("rm", ["name", "all"]);
/// assert!(error.to_string().contains("name, all"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two or more mutually exclusive parameters were supplied together.
    #[error("{operation}: parameters are mutually exclusive: {}", .options.join(", "))]
    ConflictingOptions {
        /// Operation being built.
        operation: String,
        /// The parameters that were supplied together.
        options: Vec<String>,
    },

    /// None of a group of required parameters was supplied.
    #[error("{operation}: one of the following is required: {}", .options.join(", "))]
    MissingRequiredOption {
        /// Operation being built.
        operation: String,
        /// The parameters of which at least one is needed.
        options: Vec<String>,
    },

    /// A parameter value does not match the kind its rule declares.
    #[error("invalid value for {key}: expected {expected}, found {found}")]
    InvalidValue {
        /// Parameter key.
        key: String,
        /// Description of the accepted value.
        expected: String,
        /// Description of what was supplied.
        found: String,
    },

    /// A parameter key that no rule of the operation accepts.
    #[error("{operation}: unsupported parameter: {key}")]
    UnknownParameter {
        /// Operation being built.
        operation: String,
        /// The unrecognised key.
        key: String,
    },
}

impl BuildError {
    /// Create a ConflictingOptions error.
    pub fn conflicting<I, S>(operation: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ConflictingOptions {
            operation: operation.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a MissingRequiredOption error.
    pub fn missing<I, S>(operation: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingRequiredOption {
            operation: operation.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an InvalidValue error.
    pub fn invalid_value(
        key: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an UnknownParameter error.
    pub fn unknown_parameter(operation: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UnknownParameter {
            operation: operation.into(),
            key: key.into(),
        }
    }
}
