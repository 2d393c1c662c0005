//! Command execution with a bounded timeout
//!
//! Commands are plain argument vectors ([`CommandSpec`]); nothing goes through a shell.
//! [`ProcessExecutor`] runs them one at a time on a private current-thread tokio runtime
//! and folds every process-level fault into a [`CommandOutput`]:
//!
//! - normal exit: the exit code and both streams
//! - timeout: the child is killed, code `-1`, stderr `Command timed out`
//! - spawn failure: code `-1`, stderr carries the I/O error
//!
//! Only a user interrupt escapes as an error, so the suite can abort.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::Notify;

use crate::config::resolve_path;

/// Exit code reported for timeouts, spawn failures and signal deaths
pub const FAILURE_CODE: i32 = -1;

/// stderr text of a timed-out command
pub const TIMEOUT_MESSAGE: &str = "Command timed out";

/// How long [`ProcessExecutor::interrupted`] drives the runtime
const SIGNAL_POLL: Duration = Duration::from_millis(20);

/// Errors that abort a run instead of becoming a FAILED result
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("interrupted by user")]
    Interrupted,

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// An external command as a program plus discrete arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Working directory; relative paths are resolved against the executor root
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Sentinel output for a command that exceeded its timeout.
    pub fn timed_out() -> Self {
        Self::new(FAILURE_CODE, "", TIMEOUT_MESSAGE)
    }

    /// Sentinel output for a command that could not be run at all.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::new(FAILURE_CODE, "", message)
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external commands.
///
/// Implementations must not panic on process faults; they report them through
/// [`CommandOutput`]. Scripted implementations stand in for simulators in tests.
pub trait CommandExecutor {
    fn execute(&mut self, command: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

/// Subprocess executor rooted at a fixed directory.
pub struct ProcessExecutor {
    root: PathBuf,
    timeout: Duration,
    runtime: Runtime,
    /// Holds a permit once Ctrl-C was seen, including between commands
    interrupt: Arc<Notify>,
}

impl ProcessExecutor {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Result<Self, ExecError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ExecError::Runtime)?;

        let interrupt = Arc::new(Notify::new());
        let notify = Arc::clone(&interrupt);
        runtime.spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => notify.notify_one(),
                Err(error) => tracing::warn!(%error, "cannot listen for Ctrl-C"),
            }
        });

        Ok(Self {
            root: root.into(),
            timeout,
            runtime,
            interrupt,
        })
    }

    /// Whether a Ctrl-C arrived since the last command, consuming it.
    ///
    /// The listener only runs while the runtime is driven, so this polls the
    /// runtime briefly before answering.
    pub fn interrupted(&self) -> bool {
        let interrupt = Arc::clone(&self.interrupt);
        self.runtime.block_on(async move {
            tokio::time::timeout(SIGNAL_POLL, interrupt.notified()).await.is_ok()
        })
    }

    fn working_dir(&self, command: &CommandSpec) -> PathBuf {
        match &command.cwd {
            Some(dir) => resolve_path(&self.root, dir),
            None => self.root.clone(),
        }
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&mut self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let cwd = self.working_dir(spec);
        tracing::debug!(command = %spec, cwd = %cwd.display(), "spawning");

        let mut command = tokio::process::Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let timeout = self.timeout;
        let program = spec.program.display().to_string();
        let interrupt = Arc::clone(&self.interrupt);

        self.runtime.block_on(async move {
            tokio::select! {
                outcome = tokio::time::timeout(timeout, command.output()) => Ok(match outcome {
                    Ok(Ok(output)) => {
                        let code = output.status.code().unwrap_or(FAILURE_CODE);
                        tracing::debug!(%program, code, "exited");
                        CommandOutput::new(
                            code,
                            String::from_utf8_lossy(&output.stdout),
                            String::from_utf8_lossy(&output.stderr),
                        )
                    }
                    Ok(Err(error)) => {
                        tracing::warn!(%program, %error, "failed to run command");
                        CommandOutput::fault(format!("{}: {}", program, error))
                    }
                    // Dropping the output future kills the child (kill_on_drop)
                    Err(_) => {
                        tracing::warn!(%program, timeout_secs = timeout.as_secs_f64(), "command timed out");
                        CommandOutput::timed_out()
                    }
                }),
                _ = interrupt.notified() => {
                    tracing::debug!(%program, "interrupted");
                    Err(ExecError::Interrupted)
                }
            }
        })
    }
}
