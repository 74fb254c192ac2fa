//! The operation pipeline: build, invoke, translate.
//!
//! [`Buildah`] ties the command registry, a process invoker and the outcome
//! translator together. Every call is independent; the only shared state is
//! the immutable registry.
//!
//! # Example
//!
//! ```no_run
//! use cbk::command::ParameterSet;
//! use cbk::pipeline::Buildah;
//!
//! # async fn demo() -> cbk::error::CbkResult<()> {
//! let buildah = Buildah::new();
//! let params = ParameterSet::new().with("json", true);
//!
//! let report = buildah.execute("containers", &params).await?;
//! assert!(!report.changed());
//! println!("{}", report.to_json());
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::command::{
    build, builtin_registry, ArgumentVector, CommandRegistry, DefaultCommandRegistry,
    OperationSpec, ParameterSet,
};
use crate::error::{CbkError, CbkResult};
use crate::executor::{Invoke, ProcessInvoker};
use crate::outcome::{self, Outcome};

#[cfg(feature = "observability")]
use crate::observability::Logger;

/// Default binary name, looked up on `PATH`.
pub const DEFAULT_BINARY: &str = "buildah";

/// The result of one operation, in the shape an orchestration layer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationReport {
    /// Operation name.
    pub operation: String,
    /// Binary the argument vector was (or would have been) passed to.
    pub binary: String,
    /// Argument vector, subcommand first.
    pub argv: ArgumentVector,
    /// Exit code. `None` in check mode.
    pub rc: Option<i32>,
    /// Whether the operation was only planned.
    pub check_mode: bool,
    /// Translated outcome.
    pub outcome: Outcome,
}

impl OperationReport {
    /// Whether the store was (or in check mode would be) mutated.
    pub fn changed(&self) -> bool {
        self.outcome.changed()
    }

    /// Whether the tool reported failure.
    pub fn failed(&self) -> bool {
        !self.outcome.is_success()
    }

    /// Full command line: binary followed by the argument vector.
    pub fn cmd(&self) -> Vec<String> {
        std::iter::once(self.binary.clone())
            .chain(self.argv.iter().cloned())
            .collect()
    }

    /// Turn a failed report into [`CbkError::ExternalToolFailure`].
    pub fn into_result(self) -> CbkResult<Self> {
        let Self {
            operation,
            binary,
            argv,
            rc,
            check_mode,
            outcome,
        } = self;
        let outcome = outcome::into_result(outcome, rc)?;
        Ok(Self {
            operation,
            binary,
            argv,
            rc,
            check_mode,
            outcome,
        })
    }

    /// Flat JSON result: `changed`, `failed`, `rc`, `stdout`, `stderr`,
    /// `cmd`, plus `msg` on failure.
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "changed": self.changed(),
            "failed": self.failed(),
            "rc": self.rc,
            "stdout": self.outcome.stdout(),
            "stderr": self.outcome.stderr(),
            "cmd": self.cmd(),
        });
        if let Some(message) = self.outcome.message() {
            value["msg"] = Value::String(message.to_string());
        }
        if self.check_mode {
            value["check_mode"] = Value::Bool(true);
        }
        value
    }
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.binary, self.argv)
    }
}

/// Client for running buildah operations.
pub struct Buildah {
    binary: String,
    registry: Cow<'static, DefaultCommandRegistry>,
    invoker: Arc<dyn Invoke>,
    check_mode: bool,
    #[cfg(feature = "observability")]
    audit: Option<Arc<Logger>>,
}

impl Buildah {
    /// A client for `buildah` on `PATH` with the built-in operations.
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            registry: Cow::Borrowed(builtin_registry()),
            invoker: Arc::new(ProcessInvoker::default()),
            check_mode: false,
            #[cfg(feature = "observability")]
            audit: None,
        }
    }

    /// Use a different binary name or path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Use a custom registry instead of the built-in one.
    pub fn with_registry(mut self, registry: DefaultCommandRegistry) -> Self {
        self.registry = Cow::Owned(registry);
        self
    }

    /// Use a different invoker.
    pub fn with_invoker(mut self, invoker: Arc<dyn Invoke>) -> Self {
        self.invoker = invoker;
        self
    }

    /// Build and validate only; never spawn.
    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    /// Append every operation to a markdown audit log.
    #[cfg(feature = "observability")]
    pub fn with_audit_log(mut self, logger: Logger) -> Self {
        self.audit = Some(Arc::new(logger));
        self
    }

    /// Build a client from loaded configuration.
    #[cfg(feature = "config")]
    pub fn from_config(loader: &crate::config::ConfigurationLoader) -> anyhow::Result<Self> {
        let config = &loader.config;

        let mut invoker = ProcessInvoker::default();
        if let Some(dir) = &config.buildah.working_dir {
            invoker.set_working_dir(dir)?;
        }

        #[allow(unused_mut)]
        let mut buildah = Self::new()
            .with_binary(config.buildah.binary.clone())
            .with_registry(loader.registry()?)
            .with_invoker(Arc::new(invoker))
            .with_check_mode(config.execution.check_mode);

        #[cfg(feature = "observability")]
        if let Some(log_file) = &config.logging.log_file {
            let path = shellexpand::tilde(log_file);
            let logger = Logger::new(
                Some(std::path::Path::new(path.as_ref())),
                Some(&config.logging.log_level),
            )?;
            buildah = buildah.with_audit_log(logger);
        }

        Ok(buildah)
    }

    /// The binary operations run.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Whether check mode is on.
    pub fn check_mode(&self) -> bool {
        self.check_mode
    }

    /// The registry operations are looked up in.
    pub fn registry(&self) -> &DefaultCommandRegistry {
        &self.registry
    }

    fn spec(&self, operation: &str) -> CbkResult<&OperationSpec> {
        self.registry
            .get(operation)
            .ok_or_else(|| CbkError::unknown_operation(operation))
    }

    /// Build the argument vector for `operation` without running anything.
    pub fn plan(&self, operation: &str, params: &ParameterSet) -> CbkResult<ArgumentVector> {
        let spec = self.spec(operation)?;
        Ok(build(spec, params)?)
    }

    /// Run `operation` and wait for it to finish.
    pub async fn execute(
        &self,
        operation: &str,
        params: &ParameterSet,
    ) -> CbkResult<OperationReport> {
        self.execute_with_cancel(operation, params, &CancellationToken::new())
            .await
    }

    /// Run `operation`; cancelling `cancel` kills the child.
    ///
    /// A non-zero exit is reported through [`OperationReport::outcome`],
    /// not as an error. Use [`OperationReport::into_result`] to turn it
    /// into one.
    pub async fn execute_with_cancel(
        &self,
        operation: &str,
        params: &ParameterSet,
        cancel: &CancellationToken,
    ) -> CbkResult<OperationReport> {
        let result = self.run(operation, params, cancel).await;
        if let Err(e) = &result {
            self.audit_error(operation, e);
        }
        result
    }

    async fn run(
        &self,
        operation: &str,
        params: &ParameterSet,
        cancel: &CancellationToken,
    ) -> CbkResult<OperationReport> {
        let spec = self.spec(operation)?;
        let argv = build(spec, params)?;
        tracing::debug!(operation, argv = %argv, "built argument vector");

        if self.check_mode {
            let changed = spec.policy.changed_on_success();
            tracing::info!(operation, changed, "check mode: not executing");
            let report = OperationReport {
                operation: operation.to_string(),
                binary: self.binary.clone(),
                argv,
                rc: None,
                check_mode: true,
                outcome: Outcome::Success {
                    changed,
                    stdout: String::new(),
                    stderr: String::new(),
                },
            };
            self.audit_check(&report);
            return Ok(report);
        }

        let result = self.invoker.invoke(&self.binary, &argv, cancel).await?;
        let outcome = outcome::translate_result(&result, spec.policy);

        if outcome.is_success() {
            tracing::info!(
                operation,
                rc = result.return_code,
                changed = outcome.changed(),
                "operation succeeded"
            );
        } else {
            tracing::warn!(
                operation,
                rc = result.return_code,
                error = outcome.message().unwrap_or_default(),
                "operation failed"
            );
        }

        let report = OperationReport {
            operation: operation.to_string(),
            binary: self.binary.clone(),
            argv,
            rc: Some(result.return_code),
            check_mode: false,
            outcome,
        };
        self.audit_execution(&report);
        Ok(report)
    }

    #[cfg(feature = "observability")]
    fn audit_execution(&self, report: &OperationReport) {
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.log_command_execution(
                &report.operation,
                &report.to_string(),
                report.outcome.stdout(),
                report.outcome.stderr(),
                report.rc.unwrap_or(-1),
            ) {
                tracing::warn!(error = %e, "failed to write audit log");
            }
        }
    }

    #[cfg(not(feature = "observability"))]
    fn audit_execution(&self, _report: &OperationReport) {}

    #[cfg(feature = "observability")]
    fn audit_check(&self, report: &OperationReport) {
        if let Some(logger) = &self.audit {
            if let Err(e) =
                logger.log_check_mode(&report.operation, &report.to_string(), report.changed())
            {
                tracing::warn!(error = %e, "failed to write audit log");
            }
        }
    }

    #[cfg(not(feature = "observability"))]
    fn audit_check(&self, _report: &OperationReport) {}

    #[cfg(feature = "observability")]
    fn audit_error(&self, operation: &str, error: &CbkError) {
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.log_error(operation, &error.to_string()) {
                tracing::warn!(error = %e, "failed to write audit log");
            }
        }
    }

    #[cfg(not(feature = "observability"))]
    fn audit_error(&self, _operation: &str, _error: &CbkError) {}
}

impl Default for Buildah {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buildah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buildah")
            .field("binary", &self.binary)
            .field("operations", &self.registry.len())
            .field("check_mode", &self.check_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BuildError, ChangePolicy, OperationSpec, OptionRule};
    use crate::executor::{ExecutionResult, InvocationError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a fixed result and records every call.
    struct ScriptedInvoker {
        result: ExecutionResult,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl ScriptedInvoker {
        fn new(return_code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
            Arc::new(Self {
                result: ExecutionResult {
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                    return_code,
                },
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Invoke for ScriptedInvoker {
        async fn invoke(
            &self,
            binary: &str,
            argv: &[String],
            cancel: &CancellationToken,
        ) -> Result<ExecutionResult, InvocationError> {
            if cancel.is_cancelled() {
                return Err(InvocationError::Cancelled {
                    binary: binary.to_string(),
                });
            }
            self.calls
                .lock()
                .unwrap()
                .push((binary.to_string(), argv.to_vec()));
            Ok(self.result.clone())
        }
    }

    fn params(value: serde_json::Value) -> ParameterSet {
        ParameterSet::from_json(value).unwrap()
    }

    #[tokio::test]
    async fn test_read_only_success_is_unchanged() {
        let invoker = ScriptedInvoker::new(0, "ID NAME\n", "");
        let buildah = Buildah::new().with_invoker(invoker.clone());

        let report = buildah
            .execute("containers", &params(json!({"json": true})))
            .await
            .unwrap();

        assert!(!report.changed());
        assert!(!report.failed());
        assert_eq!(report.rc, Some(0));
        assert_eq!(report.outcome.stdout(), "ID NAME\n");
        assert_eq!(
            invoker.calls(),
            vec![(
                "buildah".to_string(),
                vec!["containers".to_string(), "--json".to_string()]
            )]
        );
    }

    #[tokio::test]
    async fn test_mutating_success_is_changed() {
        let invoker = ScriptedInvoker::new(0, "sha256:abc\n", "");
        let buildah = Buildah::new()
            .with_binary("/usr/bin/buildah")
            .with_invoker(invoker.clone());

        let report = buildah
            .execute("commit", &params(json!({"container": "c1", "image_name": "img"})))
            .await
            .unwrap();

        assert!(report.changed());
        assert_eq!(report.cmd(), ["/usr/bin/buildah", "commit", "c1", "img"]);
        assert_eq!(invoker.calls()[0].0, "/usr/bin/buildah");
    }

    #[tokio::test]
    async fn test_failure_reports_stderr() {
        let invoker = ScriptedInvoker::new(1, "", "no such container\n");
        let buildah = Buildah::new().with_invoker(invoker);

        let report = buildah
            .execute("rm", &params(json!({"name": "ghost"})))
            .await
            .unwrap();

        assert!(report.failed());
        assert!(!report.changed());
        assert_eq!(report.outcome.message(), Some("no such container"));

        let json = report.to_json();
        assert_eq!(json["failed"], true);
        assert_eq!(json["changed"], false);
        assert_eq!(json["rc"], 1);
        assert_eq!(json["msg"], "no such container");

        match report.into_result().unwrap_err() {
            CbkError::ExternalToolFailure { exit_code, message } => {
                assert_eq!(exit_code, 1);
                assert_eq!(message, "no such container");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_conflict_never_invokes() {
        let invoker = ScriptedInvoker::new(0, "", "");
        let buildah = Buildah::new().with_invoker(invoker.clone());

        let err = buildah
            .execute("rm", &params(json!({"name": "c1", "all": true})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CbkError::Build(BuildError::ConflictingOptions { .. })
        ));
        assert!(err.is_validation());
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_mode_never_invokes() {
        let invoker = ScriptedInvoker::new(0, "", "");
        let buildah = Buildah::new()
            .with_invoker(invoker.clone())
            .with_check_mode(true);

        let commit = buildah
            .execute("commit", &params(json!({"container": "c1", "image_name": "img"})))
            .await
            .unwrap();
        assert!(commit.check_mode);
        assert!(commit.changed());
        assert_eq!(commit.rc, None);
        assert_eq!(commit.to_json()["check_mode"], true);

        let images = buildah.execute("images", &ParameterSet::new()).await.unwrap();
        assert!(!images.changed());

        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let buildah = Buildah::new().with_invoker(ScriptedInvoker::new(0, "", ""));

        let err = buildah.execute("build", &ParameterSet::new()).await.unwrap_err();
        assert!(matches!(err, CbkError::UnknownOperation { ref name } if name == "build"));

        let err = buildah.plan("build", &ParameterSet::new()).unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_cancelled_token_is_an_error() {
        let buildah = Buildah::new().with_invoker(ScriptedInvoker::new(0, "", ""));
        let token = CancellationToken::new();
        token.cancel();

        let err = buildah
            .execute_with_cancel("images", &ParameterSet::new(), &token)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CbkError::Invocation(InvocationError::Cancelled { .. })
        ));
    }

    #[test]
    fn test_plan() {
        let buildah = Buildah::new();
        let argv = buildah
            .plan(
                "run",
                &params(json!({"container": "c1", "command": "ls", "args": ["-la", "/"]})),
            )
            .unwrap();
        assert_eq!(argv.as_slice(), ["run", "c1", "ls", "-la", "/"]);
    }

    #[tokio::test]
    async fn test_custom_registry() {
        let mut registry = DefaultCommandRegistry::new();
        registry
            .register(
                OperationSpec::new("version", ChangePolicy::ReadOnly)
                    .option(OptionRule::switch("json", "--json")),
            )
            .unwrap();

        let invoker = ScriptedInvoker::new(0, "1.33\n", "");
        let buildah = Buildah::new()
            .with_registry(registry)
            .with_invoker(invoker.clone());

        assert!(buildah.plan("rm", &ParameterSet::new()).is_err());
        let report = buildah
            .execute("version", &params(json!({"json": true})))
            .await
            .unwrap();
        assert!(!report.changed());
        assert_eq!(invoker.calls()[0].1, ["version", "--json"]);
    }

    #[cfg(feature = "observability")]
    #[tokio::test]
    async fn test_audit_log_records_operations() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("audit.md");
        let logger = Logger::new(Some(&log_path), None).unwrap();

        let buildah = Buildah::new()
            .with_invoker(ScriptedInvoker::new(1, "", "no such container"))
            .with_audit_log(logger);

        buildah
            .execute("rm", &params(json!({"name": "ghost"})))
            .await
            .unwrap();
        let _ = buildah
            .execute("rm", &params(json!({"name": "c1", "all": true})))
            .await;

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("`buildah rm ghost`"));
        assert!(content.contains("no such container"));
        assert!(content.contains("mutually exclusive"));
    }
}
