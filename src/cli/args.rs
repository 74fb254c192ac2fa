//! Argument definitions.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::cli::error::{CliError, CliResult};
use crate::command::ParameterSet;
use crate::error::CbkError;

/// Run declarative buildah operations.
#[derive(Parser, Debug)]
#[command(name = "cbk", author, version, about = "Declarative buildah operations")]
pub struct Cli {
    /// Configuration file (default: <config dir>/cbk/cbk.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// .env file to load before reading the environment
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// buildah binary name or path
    #[arg(long, global = true, value_name = "PATH")]
    pub binary: Option<String>,

    /// Build and validate only; do not run buildah
    #[arg(long, global = true)]
    pub check: bool,

    /// Cancel the operation after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute an operation and print a JSON report
    Run(OperationArgs),
    /// Print the argument vector an operation would run
    Plan(OperationArgs),
    /// List available operations
    Operations,
}

/// An operation name and its parameters.
#[derive(Args, Debug)]
pub struct OperationArgs {
    /// Operation name (add, commit, config, ...)
    pub operation: String,

    /// Parameters as a JSON object
    #[arg(long, value_name = "JSON", conflicts_with = "params_file")]
    pub params: Option<String>,

    /// File holding the parameters as a JSON object; `-` reads stdin
    #[arg(long, value_name = "FILE")]
    pub params_file: Option<PathBuf>,
}

impl OperationArgs {
    /// Parse the supplied parameters. No parameters is an empty set.
    pub fn parameters(&self) -> CliResult<ParameterSet> {
        let text = match (&self.params, &self.params_file) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) if path.as_os_str() == "-" => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                CliError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
            })?,
            (None, None) => return Ok(ParameterSet::new()),
        };

        let value: serde_json::Value = serde_json::from_str(&text)?;
        ParameterSet::from_json(value).map_err(|e| CbkError::from(e).into())
    }
}
