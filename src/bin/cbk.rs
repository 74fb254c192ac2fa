//! `cbk` command-line entry point.

use std::process::ExitCode;

use cbk::cli::{self, utils, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr; stdout carries the JSON report.
///
/// `RUST_LOG` wins; otherwise the configured log level is used.
fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let loader = match cli::load_configuration(&args) {
        Ok(loader) => loader,
        Err(e) => {
            init_logging("warn");
            utils::display_error(&e);
            return ExitCode::from(e.exit_code());
        }
    };
    init_logging(&loader.config.logging.log_level);
    tracing::debug!(config = %loader.config_path.display(), "configuration loaded");

    match cli::run(&args, &loader).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            utils::display_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}
