//! Command dispatch for the `cbk` binary.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, OperationArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils;
use crate::command::ParameterSet;
use crate::config::{ConfigurationLoader, EnvironmentLoader};
use crate::pipeline::{Buildah, OperationReport};

/// Load configuration and apply overrides: command-line flags win over
/// environment variables, which win over the config file.
pub fn load_configuration(cli: &Cli) -> CliResult<ConfigurationLoader> {
    let env = EnvironmentLoader::new(cli.env_file.as_deref());
    let mut loader = ConfigurationLoader::new(cli.config.as_deref())?;
    env.apply(&mut loader.config);

    let config = &mut loader.config;
    if let Some(binary) = &cli.binary {
        config.buildah.binary = binary.clone();
    }
    if cli.check {
        config.execution.check_mode = true;
    }
    if let Some(timeout) = cli.timeout {
        config.execution.timeout_seconds = timeout;
    }

    Ok(loader)
}

/// Run the parsed command. Returns the process exit code.
pub async fn run(cli: &Cli, loader: &ConfigurationLoader) -> CliResult<u8> {
    let buildah = Buildah::from_config(loader)?;

    match &cli.command {
        Commands::Operations => {
            println!("{}", utils::format_operations(buildah.registry()));
            Ok(0)
        }
        Commands::Plan(args) => {
            let params = args.parameters()?;
            let argv = buildah.plan(&args.operation, &params)?;
            println!("{}", serde_json::to_string_pretty(&argv)?);
            Ok(0)
        }
        Commands::Run(args) => {
            let timeout = match loader.config.execution.timeout_seconds {
                0 => None,
                secs => Some(secs),
            };
            let report = run_operation(&buildah, args, timeout).await?;

            println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            eprintln!("{}", utils::summary_line(&report));
            Ok(if report.failed() { 1 } else { 0 })
        }
    }
}

async fn run_operation(
    buildah: &Buildah,
    args: &OperationArgs,
    timeout_secs: Option<u64>,
) -> CliResult<OperationReport> {
    let params: ParameterSet = args.parameters()?;
    let token = CancellationToken::new();

    let execution = buildah.execute_with_cancel(&args.operation, &params, &token);
    tokio::pin!(execution);

    let deadline = async {
        match timeout_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    // On timeout or Ctrl-C the token is cancelled and the execution is
    // still awaited, so the child is killed and reaped before returning.
    let interruption = tokio::select! {
        result = &mut execution => return Ok(result?),
        _ = deadline => CliError::Timeout(timeout_secs.unwrap_or_default()),
        _ = tokio::signal::ctrl_c() => CliError::Interrupted,
    };

    tracing::warn!(operation = %args.operation, reason = %interruption, "cancelling operation");
    token.cancel();
    if let Err(e) = execution.await {
        tracing::debug!(error = %e, "cancelled operation finished");
    }
    Err(interruption)
}
