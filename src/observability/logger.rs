//! Markdown audit log for buildah operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Audit logger for operations and the commands they ran.
///
/// Entries are appended to a markdown file; a one-line summary of each entry
/// is also emitted through `tracing`.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO"). At "DEBUG" the
    ///   captured stdout of successful commands is recorded too.
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let mut dir = std::env::temp_dir();
                dir.push("cbk-logs");
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create log directory: {}", dir.display())
                })?;
                let filename = format!(
                    "cbk_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        let log_level = log_level.unwrap_or("INFO").to_uppercase();

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level,
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Buildah Operation Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    fn is_debug(&self) -> bool {
        matches!(self.log_level.as_str(), "DEBUG" | "TRACE")
    }

    /// Log a finished command.
    ///
    /// # Arguments
    /// * `operation` - Operation name (add, commit, ...).
    /// * `command` - Rendered command line.
    /// * `stdout` - Command stdout.
    /// * `stderr` - Command stderr.
    /// * `return_code` - Command return code.
    pub fn log_command_execution(
        &self,
        operation: &str,
        command: &str,
        stdout: &str,
        stderr: &str,
        return_code: i32,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Command Execution - {}\n\n**Operation:** {}\n**Command:** `{}`\n**Return Code:** {}\n\n",
            now.to_rfc3339(),
            operation,
            command,
            return_code
        );

        // Listing output can be large; keep it out of the log unless asked.
        if !stdout.is_empty() && (return_code != 0 || self.is_debug()) {
            content.push_str(&format!("**Stdout:**\n```\n{}\n```\n\n", stdout.trim_end()));
        }

        if !stderr.is_empty() {
            content.push_str(&format!("**Stderr:**\n```\n{}\n```\n\n", stderr.trim_end()));
        }

        self.append_to_log(&content)?;
        tracing::info!(operation, return_code, "command recorded in audit log");
        Ok(())
    }

    /// Log an operation that was planned in check mode and not executed.
    pub fn log_check_mode(&self, operation: &str, command: &str, would_change: bool) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Check Mode - {}\n\n**Operation:** {}\n**Command:** `{}`\n**Would change:** {}\n\n",
            now.to_rfc3339(),
            operation,
            command,
            would_change
        );

        self.append_to_log(&content)?;
        tracing::info!(operation, would_change, "check-mode plan recorded in audit log");
        Ok(())
    }

    /// Log an operation rejected before anything was spawned.
    pub fn log_error(&self, operation: &str, error: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Error - {}\n\n**Operation:** {}\n**Error:** {}\n\n",
            now.to_rfc3339(),
            operation,
            error
        );

        self.append_to_log(&content)?;
        tracing::warn!(operation, error, "operation error recorded in audit log");
        Ok(())
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

#[cfg(test)]
mod tests;
