//! exec::mock
//!
//! Mock executor for deterministic testing.
//!
//! # Design
//!
//! The mock replays a FIFO script of responses, one per `exec` call, and
//! records every invocation so tests can assert on the exact command
//! lines, working directories, and environments that were dispatched.
//! Running past the end of the script is reported as a launch failure.
//!
//! # Example
//!
//! ```
//! use p4session::exec::mock::{MockExecutor, MockResponse};
//! use p4session::exec::{Executor, ExecOptions};
//!
//! # tokio_test::block_on(async {
//! let executor = MockExecutor::new()
//!     .respond(MockResponse::stderr("foo.c - file(s) not on client.\n"))
//!     .respond(MockResponse::launch_failure("sh: not found"));
//!
//! let options = ExecOptions::new("/ws");
//! let first = executor.exec("p4 have foo.c", &options).await.unwrap();
//! assert!(first.stderr.contains("not on client"));
//! assert!(executor.exec("p4 have foo.c", &options).await.is_err());
//! # });
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ExecError, ExecOptions, ExecOutput, Executor};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// The process ran; report this output.
    Output(ExecOutput),
    /// The process could not be launched.
    LaunchFailure(ExecError),
}

impl MockResponse {
    /// Clean run printing `stdout`.
    pub fn stdout(stdout: impl Into<String>) -> Self {
        MockResponse::Output(ExecOutput::success(stdout))
    }

    /// Run that wrote `stderr` and nothing else.
    pub fn stderr(stderr: impl Into<String>) -> Self {
        MockResponse::Output(ExecOutput::with_stderr("", stderr))
    }

    /// Run that wrote to both streams.
    pub fn output(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockResponse::Output(ExecOutput::with_stderr(stdout, stderr))
    }

    /// Run the executor reports as failed.
    pub fn exec_error(message: impl Into<String>) -> Self {
        MockResponse::Output(ExecOutput::failed(message))
    }

    /// Process that never started.
    pub fn launch_failure(message: impl Into<String>) -> Self {
        MockResponse::LaunchFailure(ExecError::Spawn {
            program: "mock".to_string(),
            message: message.into(),
        })
    }
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockInvocation {
    /// The full command line.
    pub command_line: String,
    /// Working directory at dispatch.
    pub cwd: PathBuf,
    /// Environment at dispatch.
    pub env: BTreeMap<String, String>,
}

/// Mock executor for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share the
/// same script and recordings.
#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    inner: Arc<Mutex<MockExecutorInner>>,
}

#[derive(Debug, Default)]
struct MockExecutorInner {
    script: VecDeque<MockResponse>,
    invocations: Vec<MockInvocation>,
}

impl MockExecutor {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a response to the script (builder form).
    pub fn respond(self, response: MockResponse) -> Self {
        self.push(response);
        self
    }

    /// Append a response to the script.
    pub fn push(&self, response: MockResponse) {
        let mut inner = self.inner.lock().unwrap();
        inner.script.push_back(response);
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inner.lock().unwrap().script.len()
    }

    /// All recorded invocations, oldest first.
    pub fn invocations(&self) -> Vec<MockInvocation> {
        self.inner.lock().unwrap().invocations.clone()
    }

    /// Recorded command lines, oldest first.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|i| i.command_line)
            .collect()
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn exec(
        &self,
        command_line: &str,
        options: &ExecOptions,
    ) -> Result<ExecOutput, ExecError> {
        let mut inner = self.inner.lock().unwrap();
        inner.invocations.push(MockInvocation {
            command_line: command_line.to_string(),
            cwd: options.cwd.clone(),
            env: options.env.clone(),
        });

        match inner.script.pop_front() {
            Some(MockResponse::Output(output)) => Ok(output),
            Some(MockResponse::LaunchFailure(err)) => Err(err),
            None => Err(ExecError::Unavailable(format!(
                "no scripted response for '{}'",
                command_line
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_in_order() {
        let executor = MockExecutor::new()
            .respond(MockResponse::stdout("one"))
            .respond(MockResponse::exec_error("two"));
        let options = ExecOptions::new("/ws");

        let first = executor.exec("a", &options).await.unwrap();
        let second = executor.exec("b", &options).await.unwrap();

        assert_eq!(first.stdout, "one");
        assert_eq!(second.error.as_deref(), Some("two"));
        assert_eq!(executor.remaining(), 0);
    }

    #[tokio::test]
    async fn exhausted_script_is_launch_failure() {
        let executor = MockExecutor::new();
        let err = executor
            .exec("p4 info", &ExecOptions::new("/ws"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Unavailable(msg) if msg.contains("p4 info")));
    }

    #[tokio::test]
    async fn records_cwd_and_env() {
        let executor = MockExecutor::new().respond(MockResponse::stdout(""));
        let mut options = ExecOptions::new("/ws/sub");
        options.env.insert("PWD".into(), "/ws/sub".into());

        executor.exec("p4 sync", &options).await.unwrap();

        let calls = executor.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].cwd, PathBuf::from("/ws/sub"));
        assert_eq!(calls[0].env.get("PWD").map(String::as_str), Some("/ws/sub"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let executor = MockExecutor::new();
        let clone = executor.clone();
        clone.push(MockResponse::stdout("shared"));

        let output = executor.exec("x", &ExecOptions::new("/")).await.unwrap();
        assert_eq!(output.stdout, "shared");
        assert_eq!(clone.command_lines(), vec!["x"]);
    }
}
