//! Process invoker: runs the buildah binary and captures its output.
//!
//! The argument vector is passed to the child verbatim, never through a
//! shell. A non-zero exit is returned as data in [`ExecutionResult`]; only
//! failures to start, capture or finish the child are errors.

mod resolve;

pub use resolve::{resolve_binary, resolve_binary_in};

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tokio_util::sync::CancellationToken;

/// Execution result containing command output and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Captured stdout, lossily decoded as UTF-8.
    pub stdout: String,
    /// Captured stderr, lossily decoded as UTF-8.
    pub stderr: String,
    /// Exit code; `-1` when the child was terminated by a signal.
    pub return_code: i32,
}

impl ExecutionResult {
    /// Whether the child exited with code 0.
    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

/// Errors raised while starting or supervising the child process.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The binary could not be resolved; nothing was spawned.
    #[error("binary not found: {binary}")]
    BinaryNotFound {
        /// The binary name or path that was looked up.
        binary: String,
    },

    /// The child could not be spawned.
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        /// The binary that failed to start.
        binary: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Reading output or waiting for the child failed.
    #[error("I/O error while running {binary}: {source}")]
    Io {
        /// The running binary.
        binary: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The invocation was cancelled and the child's process group killed.
    #[error("invocation of {binary} was cancelled")]
    Cancelled {
        /// The cancelled binary.
        binary: String,
    },
}

impl InvocationError {
    /// Create a BinaryNotFound error.
    pub fn binary_not_found(binary: impl Into<String>) -> Self {
        Self::BinaryNotFound {
            binary: binary.into(),
        }
    }
}

/// Something that can run a binary with an argument vector.
///
/// Implemented by [`ProcessInvoker`]; tests substitute scripted invokers.
#[async_trait]
pub trait Invoke: Send + Sync {
    /// Resolve `binary`, run it with `argv` and wait for it to exit.
    ///
    /// Cancelling `cancel` terminates the child and yields
    /// [`InvocationError::Cancelled`].
    async fn invoke(
        &self,
        binary: &str,
        argv: &[String],
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, InvocationError>;
}

/// Spawns real child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    working_dir: Option<PathBuf>,
}

impl ProcessInvoker {
    /// Initialize the invoker.
    ///
    /// # Arguments
    /// * `working_dir` - Working directory for the child. If None, the
    ///   current directory is inherited.
    pub fn new(working_dir: Option<&Path>) -> Self {
        Self {
            working_dir: working_dir.map(Path::to_path_buf),
        }
    }

    /// Get the working directory, if one is set.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Set the working directory.
    pub fn set_working_dir(&mut self, working_dir: &Path) -> io::Result<()> {
        if !working_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Working directory does not exist: {}", working_dir.display()),
            ));
        }
        self.working_dir = Some(working_dir.to_path_buf());
        Ok(())
    }
}

#[async_trait]
impl Invoke for ProcessInvoker {
    async fn invoke(
        &self,
        binary: &str,
        argv: &[String],
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, InvocationError> {
        let path = resolve_binary(binary)?;
        let name = path.display().to_string();

        let mut cmd = TokioCommand::new(&path);
        cmd.args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                InvocationError::binary_not_found(&name)
            } else {
                InvocationError::Spawn {
                    binary: name.clone(),
                    source,
                }
            }
        })?;

        let pid = child.id();
        tracing::debug!(binary = %name, pid = ?pid, "spawned child process");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = {
            let capture = async {
                tokio::try_join!(read_stream(stdout), read_stream(stderr), child.wait())
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = capture => Some(result),
            }
        };

        match finished {
            None => {
                kill_process_group(pid);
                if let Err(e) = child.kill().await {
                    tracing::warn!(binary = %name, error = %e, "failed to reap cancelled child");
                }
                Err(InvocationError::Cancelled { binary: name })
            }
            Some(Ok((stdout, stderr, status))) => Ok(ExecutionResult {
                stdout,
                stderr,
                return_code: status.code().unwrap_or(-1),
            }),
            Some(Err(source)) => Err(InvocationError::Io {
                binary: name,
                source,
            }),
        }
    }
}

/// Run `binary` with `argv` using a default [`ProcessInvoker`] and no
/// cancellation.
pub async fn invoke(binary: &str, argv: &[String]) -> Result<ExecutionResult, InvocationError> {
    ProcessInvoker::default()
        .invoke(binary, argv, &CancellationToken::new())
        .await
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid else { return };
    let Ok(raw) = i32::try_from(pid) else { return };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        // ESRCH: the group already exited.
        tracing::debug!(pid = raw, error = %e, "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[cfg(all(test, unix))]
mod tests;
