//! exec
//!
//! Process execution capability consumed by the command runner.
//!
//! # Design
//!
//! The `Executor` trait is the sole seam between this crate and the
//! operating system. It is async because commands wait on external
//! processes, and it is fully substitutable: tests use [`mock::MockExecutor`],
//! production uses [`ShellExecutor`].
//!
//! An executor reports three distinct outcomes:
//!
//! - `Err(ExecError)`: the process could not be launched at all
//! - `Ok(ExecOutput { error: Some(..), .. })`: it ran and failed
//! - `Ok(ExecOutput { error: None, .. })`: it ran to completion
//!
//! Timeouts are the executor's business; callers impose none.
//!
//! # Example
//!
//! ```
//! use p4session::exec::{Executor, ExecOptions, ExecOutput};
//! use p4session::exec::mock::{MockExecutor, MockResponse};
//!
//! # tokio_test::block_on(async {
//! let executor = MockExecutor::new().respond(MockResponse::stdout("ok\n"));
//! let options = ExecOptions::new("/work");
//!
//! let output = executor.exec("p4 info", &options).await.unwrap();
//! assert_eq!(output, ExecOutput::success("ok\n"));
//! assert_eq!(executor.command_lines(), vec!["p4 info"]);
//! # });
//! ```

pub mod mock;
mod shell;

pub use shell::ShellExecutor;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised when a process cannot be launched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// Spawning the process failed (missing shell, bad cwd, ...).
    #[error("failed to launch '{program}': {message}")]
    Spawn {
        /// The program that failed to start
        program: String,
        /// Description of the OS error
        message: String,
    },

    /// The executor cannot run anything right now.
    #[error("executor unavailable: {0}")]
    Unavailable(String),
}

/// Options for a single execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory of the process.
    pub cwd: PathBuf,
    /// Complete environment of the process.
    pub env: BTreeMap<String, String>,
    /// Kill the process if it runs longer than this.
    pub timeout: Option<Duration>,
    /// Shell used to interpret the command line.
    pub shell: Option<String>,
}

impl ExecOptions {
    /// Create options with a working directory and an empty environment.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Default::default()
        }
    }
}

/// Captured result of a process that was launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Execution error (nonzero exit, signal, timeout), if any.
    pub error: Option<String>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ExecOutput {
    /// A clean run with the given standard output.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    /// A run that exited normally but wrote diagnostics.
    pub fn with_stderr(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            error: None,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// A run the executor reports as failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Capability to run a command line.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `command_line` with the given options.
    async fn exec(&self, command_line: &str, options: &ExecOptions)
        -> Result<ExecOutput, ExecError>;
}
