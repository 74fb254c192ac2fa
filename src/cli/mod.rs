//! Command-line front end for the operation pipeline.
//!
//! ```text
//! cbk [--config FILE] [--env-file FILE] [--binary PATH] [--check] [--timeout SECS] <command>
//!
//!   run <operation> [--params JSON | --params-file FILE]   execute, print a JSON report
//!   plan <operation> [--params JSON | --params-file FILE]  print the argument vector
//!   operations                                            list operations
//! ```
//!
//! Exit codes: `0` success, `1` the operation failed, `2` usage or
//! validation error (nothing was spawned).

pub mod args;
pub mod error;
pub mod runner;
pub mod utils;

// Re-exports for convenience
pub use args::{Cli, Commands, OperationArgs};
pub use error::{CliError, CliResult};
pub use runner::{load_configuration, run};
