//! exec::shell
//!
//! Executor backed by real subprocesses.
//!
//! Command lines are handed to a shell (`sh -c` on Unix, `cmd /C` on
//! Windows) so pipes and `$VAR` expansion behave as they would when typed.
//! Nothing is escaped.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{ExecError, ExecOptions, ExecOutput, Executor};

#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd";
#[cfg(not(windows))]
const DEFAULT_SHELL: &str = "sh";

/// Runs command lines through a system shell.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}

impl ShellExecutor {
    /// Create an executor using the platform's default shell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor using a specific shell.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// The shell used when options do not override it.
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

/// Flag that makes `shell` run its next argument as a command line.
fn command_flag(shell: &str) -> &'static str {
    let name = std::path::Path::new(shell)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(shell);
    if name.eq_ignore_ascii_case("cmd") {
        "/C"
    } else {
        "-c"
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn exec(
        &self,
        command_line: &str,
        options: &ExecOptions,
    ) -> Result<ExecOutput, ExecError> {
        let shell = options.shell.as_deref().unwrap_or(&self.shell);

        let mut command = Command::new(shell);
        command
            .arg(command_flag(shell))
            .arg(command_line)
            .current_dir(&options.cwd)
            .env_clear()
            .envs(&options.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let pending = command.output();
        let result = match options.timeout {
            Some(limit) => match tokio::time::timeout(limit, pending).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    tracing::warn!(
                        timeout_ms = limit.as_millis() as u64,
                        "command timed out"
                    );
                    return Ok(ExecOutput::failed(format!(
                        "Command timed out after {}ms: {}",
                        limit.as_millis(),
                        command_line
                    )));
                }
            },
            None => pending.await,
        };

        let output = result.map_err(|e| ExecError::Spawn {
            program: shell.to_string(),
            message: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let error = if output.status.success() {
            None
        } else {
            Some(format!("Command failed: {}\n{}", command_line, stderr))
        };

        Ok(ExecOutput {
            error,
            stdout,
            stderr,
        })
    }
}
