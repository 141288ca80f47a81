//! Integration tests for the subprocess-backed executor.
//!
//! These tests run real `sh` processes and are Unix-only.

#![cfg(unix)]

use std::collections::BTreeMap;
use std::time::Duration;

use tempfile::TempDir;

use p4session::client::{P4Error, P4};
use p4session::core::config::{Config, GlobalConfig};
use p4session::core::session::process_env;
use p4session::exec::{ExecError, ExecOptions, Executor, ShellExecutor};

fn options(dir: &TempDir) -> ExecOptions {
    let mut options = ExecOptions::new(dir.path());
    options.env = process_env();
    options
}

mod executor {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let dir = TempDir::new().unwrap();
        let output = ShellExecutor::new()
            .exec("echo hello", &options(&dir))
            .await
            .unwrap();

        assert_eq!(output.error, None);
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "");
    }

    #[tokio::test]
    async fn captures_stderr_on_success() {
        let dir = TempDir::new().unwrap();
        let output = ShellExecutor::new()
            .exec("echo oops 1>&2", &options(&dir))
            .await
            .unwrap();

        assert_eq!(output.error, None);
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn nonzero_exit_is_execution_error() {
        let dir = TempDir::new().unwrap();
        let line = "echo bad 1>&2; exit 3";
        let output = ShellExecutor::new()
            .exec(line, &options(&dir))
            .await
            .unwrap();

        assert_eq!(
            output.error.as_deref(),
            Some("Command failed: echo bad 1>&2; exit 3\nbad\n")
        );
    }

    #[tokio::test]
    async fn missing_cwd_is_launch_failure() {
        let dir = TempDir::new().unwrap();
        let mut options = options(&dir);
        options.cwd = dir.path().join("does-not-exist");

        let err = ShellExecutor::new()
            .exec("echo hi", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[tokio::test]
    async fn runs_in_cwd_with_explicit_env() {
        let dir = TempDir::new().unwrap();
        let mut options = options(&dir);
        options.env = BTreeMap::from([("GREETING".to_string(), "hi there".to_string())]);

        let output = ShellExecutor::new()
            .exec("echo \"$GREETING\"; pwd", &options)
            .await
            .unwrap();

        let expected_dir = dir.path().canonicalize().unwrap();
        let mut lines = output.stdout.lines();
        assert_eq!(lines.next(), Some("hi there"));
        assert_eq!(
            lines.next().map(|p| std::path::Path::new(p).canonicalize().unwrap()),
            Some(expected_dir)
        );
    }

    #[tokio::test]
    async fn timeout_fails_the_command() {
        let dir = TempDir::new().unwrap();
        let mut options = options(&dir);
        options.timeout = Some(Duration::from_millis(100));

        let output = ShellExecutor::new()
            .exec("sleep 5", &options)
            .await
            .unwrap();
        assert!(output.error.unwrap().contains("timed out"));
    }
}

mod client {
    use super::*;

    fn echo_client(dir: &TempDir) -> P4 {
        let config = Config {
            global: GlobalConfig {
                p4_binary: Some("echo".into()),
                ..Default::default()
            },
            workspace: None,
        };
        P4::with_executor(ShellExecutor::new(), dir.path())
            .unwrap()
            .with_config(config)
    }

    #[tokio::test]
    async fn run_command_through_real_shell() {
        let dir = TempDir::new().unwrap();
        let out = echo_client(&dir)
            .run_command("fstat", "a.c")
            .await
            .unwrap();
        assert_eq!(out, "fstat a.c\n");
    }

    #[tokio::test]
    async fn pwd_follows_session() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let mut p4 = echo_client(&dir);
        p4.cd("sub");

        let out = p4.run_shell_command("printf", "%s \"$PWD\"").await.unwrap();
        assert_eq!(out, dir.path().join("sub").to_string_lossy());
    }

    #[tokio::test]
    async fn shell_stderr_fails() {
        let dir = TempDir::new().unwrap();
        let err = echo_client(&dir)
            .run_shell_command("echo warn 1>&2", None::<&str>)
            .await
            .unwrap_err();
        assert!(matches!(err, P4Error::Diagnostic { stderr } if stderr == "warn\n"));
    }
}
