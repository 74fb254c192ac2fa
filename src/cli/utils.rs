//! Output helpers for CLI commands

use colored::*;

use crate::cli::error::CliError;
use crate::command::{CommandRegistry, DefaultCommandRegistry};
use crate::pipeline::OperationReport;

/// Display a user-friendly error message with a hint for common mistakes
pub fn display_error(error: &CliError) {
    eprintln!("{} {}", "error:".red().bold(), error.to_string().red());

    let text = error.to_string().to_lowercase();
    if text.contains("binary not found") {
        eprintln!(
            "{} install buildah or point --binary / CBK_BUILDAH_BIN at it",
            "hint:".blue()
        );
    } else if text.contains("unknown operation") {
        eprintln!("{} run 'cbk operations' to list operations", "hint:".blue());
    }
}

/// One-line summary of a finished operation, for stderr.
pub fn summary_line(report: &OperationReport) -> String {
    let rc = report
        .rc
        .map(|rc| rc.to_string())
        .unwrap_or_else(|| "-".to_string());

    if report.failed() {
        format!(
            "{} {} (rc={}): {}",
            "failed".red().bold(),
            report.operation,
            rc,
            report.outcome.message().unwrap_or_default()
        )
    } else if report.changed() {
        format!("{} {} (rc={})", "changed".yellow().bold(), report.operation, rc)
    } else {
        format!("{} {} (rc={})", "ok".green().bold(), report.operation, rc)
    }
}

/// Operation listing: name, change policy and subcommand, one per line.
pub fn format_operations(registry: &DefaultCommandRegistry) -> String {
    registry
        .list()
        .into_iter()
        .map(|spec| format!("{:<12} {:<10} {}", spec.name, spec.policy.to_string(), spec.subcommand))
        .collect::<Vec<_>>()
        .join("\n")
}
