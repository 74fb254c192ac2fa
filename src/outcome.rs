//! Outcome translation: exit status + change policy -> uniform result.

use serde::{Deserialize, Serialize};

use crate::command::ChangePolicy;
use crate::error::CbkError;

/// The uniform result of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The tool exited with code 0.
    Success {
        /// Whether the store was mutated.
        changed: bool,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },
    /// The tool exited with a non-zero code.
    Failure {
        /// Captured stderr, or a description of the exit code when stderr
        /// was empty.
        message: String,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },
}

impl Outcome {
    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The changed flag. Always `false` for failures.
    pub fn changed(&self) -> bool {
        match self {
            Self::Success { changed, .. } => *changed,
            Self::Failure { .. } => false,
        }
    }

    /// Captured stdout.
    pub fn stdout(&self) -> &str {
        match self {
            Self::Success { stdout, .. } | Self::Failure { stdout, .. } => stdout,
        }
    }

    /// Captured stderr.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Success { stderr, .. } | Self::Failure { stderr, .. } => stderr,
        }
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

/// Translate an exit code and captured output under `policy`.
///
/// # Example
///
/// ```
/// use cbk::command::ChangePolicy;
/// use cbk::outcome::{translate, Outcome};
///
/// let outcome = translate(1, "", "no such container\n", ChangePolicy::Mutating);
/// assert_eq!(outcome.message(), Some("no such container"));
/// assert!(!outcome.changed());
/// ```
pub fn translate(exit_code: i32, stdout: &str, stderr: &str, policy: ChangePolicy) -> Outcome {
    if exit_code == 0 {
        return Outcome::Success {
            changed: policy.changed_on_success(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        };
    }

    let trimmed = stderr.trim();
    let message = if trimmed.is_empty() {
        describe_exit(exit_code)
    } else {
        trimmed.to_string()
    };

    Outcome::Failure {
        message,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// Translate a finished process result.
#[cfg(feature = "executor")]
pub fn translate_result(result: &crate::executor::ExecutionResult, policy: ChangePolicy) -> Outcome {
    translate(result.return_code, &result.stdout, &result.stderr, policy)
}

/// Convert a failure into [`CbkError::ExternalToolFailure`].
pub fn into_result(outcome: Outcome, exit_code: Option<i32>) -> Result<Outcome, CbkError> {
    match outcome {
        Outcome::Failure { message, .. } => Err(CbkError::ExternalToolFailure {
            exit_code: exit_code.unwrap_or(-1),
            message,
        }),
        success => Ok(success),
    }
}

fn describe_exit(exit_code: i32) -> String {
    if exit_code < 0 {
        "command terminated by a signal".to_string()
    } else {
        format!("command exited with code {}", exit_code)
    }
}
