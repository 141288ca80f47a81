//! client::runner
//!
//! Executes one command line and classifies what came back.
//!
//! # Classification
//!
//! Checked in order, first match wins:
//!
//! 1. The executor failed to launch: [`P4Error::Launch`]
//! 2. The executor reported an error: [`P4Error::Execution`], streams unread
//! 3. Diagnostics remain after dropping benign "no such file" lines:
//!    [`P4Error::AuthInvalid`] for the invalid-ticket signature,
//!    [`P4Error::Diagnostic`] otherwise
//! 4. Success with standard output
//!
//! The runner never parses output and never retries; see
//! [`reauth`](super::reauth) for the retry.

use crate::exec::{ExecOptions, ExecOutput, Executor};

use super::errors::P4Error;

/// Diagnostic text meaning the session's ticket is missing or invalid.
pub const AUTH_INVALID_SIGNATURE: &str = "Perforce password (P4PASSWD) invalid or unset.";

/// Substring marking a benign diagnostic line.
///
/// `p4 fstat *` reports directories and unmatched names this way.
const BENIGN_MARKER: &str = "no such file";

/// What the diagnostic stream says about a completed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostics {
    /// Nothing but benign lines.
    Clean,
    /// The invalid-ticket signature, exactly.
    AuthInvalid(String),
    /// Anything else.
    Failure(String),
}

/// Drop benign "no such file" lines from a diagnostic stream.
pub fn filter_benign(stderr: &str) -> String {
    stderr
        .split('\n')
        .filter(|line| {
            let benign = line.contains(BENIGN_MARKER);
            if benign {
                tracing::debug!(line = %line, "ignoring benign diagnostic");
            }
            !benign
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Classify a diagnostic stream.
///
/// This is the only place the invalid-ticket signature is matched. The
/// match is exact after benign lines are removed; only trailing line
/// terminators are disregarded.
///
/// # Example
///
/// ```
/// use p4session::client::runner::{classify_diagnostics, Diagnostics};
///
/// assert_eq!(classify_diagnostics("bar - no such file(s).\n"), Diagnostics::Clean);
/// assert!(matches!(
///     classify_diagnostics("Perforce password (P4PASSWD) invalid or unset.\n"),
///     Diagnostics::AuthInvalid(_)
/// ));
/// assert!(matches!(classify_diagnostics("fdsa\n"), Diagnostics::Failure(_)));
/// ```
pub fn classify_diagnostics(stderr: &str) -> Diagnostics {
    let filtered = filter_benign(stderr);

    if filtered.is_empty() {
        Diagnostics::Clean
    } else if filtered.trim_end_matches(['\r', '\n']) == AUTH_INVALID_SIGNATURE {
        Diagnostics::AuthInvalid(filtered)
    } else {
        Diagnostics::Failure(filtered)
    }
}

/// Turn a completed execution into standard output or an error.
pub fn classify_output(output: ExecOutput) -> Result<String, P4Error> {
    if let Some(message) = output.error {
        return Err(P4Error::Execution { message });
    }

    match classify_diagnostics(&output.stderr) {
        Diagnostics::Clean => Ok(output.stdout),
        Diagnostics::AuthInvalid(stderr) => Err(P4Error::AuthInvalid { stderr }),
        Diagnostics::Failure(stderr) => Err(P4Error::Diagnostic { stderr }),
    }
}

/// Run one command line and classify the result.
pub async fn run_once(
    executor: &dyn Executor,
    command_line: &str,
    options: &ExecOptions,
) -> Result<String, P4Error> {
    tracing::debug!(
        command = %command_line,
        cwd = %options.cwd.display(),
        "dispatching command"
    );

    let output = executor.exec(command_line, options).await?;
    classify_output(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::mock::{MockExecutor, MockResponse};

    mod filter {
        use super::*;

        #[test]
        fn drops_only_benign_lines() {
            let stderr = "a - no such file(s).\nreal problem\nb - no such file(s).\n";
            assert_eq!(filter_benign(stderr), "real problem\n");
        }

        #[test]
        fn all_benign_is_empty() {
            assert_eq!(filter_benign("bar - no such file(s).\n"), "");
        }
    }

    mod classify {
        use super::*;

        #[test]
        fn empty_is_clean() {
            assert_eq!(classify_diagnostics(""), Diagnostics::Clean);
        }

        #[test]
        fn benign_only_is_clean() {
            assert_eq!(
                classify_diagnostics("<file> - no such file(s).\n"),
                Diagnostics::Clean
            );
            assert_eq!(
                classify_diagnostics("a - no such file(s).\nb - no such file(s).\n"),
                Diagnostics::Clean
            );
        }

        #[test]
        fn whitespace_only_is_failure() {
            assert_eq!(classify_diagnostics("\n"), Diagnostics::Failure("\n".into()));
            assert_eq!(classify_diagnostics("  "), Diagnostics::Failure("  ".into()));
        }

        #[test]
        fn exact_signature_is_auth() {
            assert_eq!(
                classify_diagnostics(AUTH_INVALID_SIGNATURE),
                Diagnostics::AuthInvalid(AUTH_INVALID_SIGNATURE.to_string())
            );
        }

        #[test]
        fn signature_after_benign_lines_is_auth() {
            let stderr = format!("x - no such file(s).\n{}\n", AUTH_INVALID_SIGNATURE);
            assert!(matches!(
                classify_diagnostics(&stderr),
                Diagnostics::AuthInvalid(_)
            ));
        }

        #[test]
        fn signature_with_other_text_is_failure() {
            let stderr = format!("{}\nsomething else", AUTH_INVALID_SIGNATURE);
            assert!(matches!(
                classify_diagnostics(&stderr),
                Diagnostics::Failure(_)
            ));
        }

        #[test]
        fn signature_is_not_a_pattern() {
            let stderr = format!("prefix {}", AUTH_INVALID_SIGNATURE);
            assert!(matches!(
                classify_diagnostics(&stderr),
                Diagnostics::Failure(_)
            ));
        }
    }

    mod output {
        use super::*;

        #[test]
        fn execution_error_wins_over_streams() {
            let output = ExecOutput {
                error: Some("boom".into()),
                stdout: "ignored".into(),
                stderr: AUTH_INVALID_SIGNATURE.into(),
            };
            let err = classify_output(output).unwrap_err();
            assert!(matches!(err, P4Error::Execution { message } if message == "boom"));
        }

        #[test]
        fn diagnostics_fail() {
            let err = classify_output(ExecOutput::with_stderr("out", "fdsa\n")).unwrap_err();
            assert_eq!(err.stderr(), Some("fdsa\n"));
        }

        #[test]
        fn blank_line_diagnostic_fails() {
            let err = classify_output(ExecOutput::with_stderr("out", "\n")).unwrap_err();
            assert!(matches!(err, P4Error::Diagnostic { .. }));
        }

        #[test]
        fn benign_diagnostics_succeed_with_stdout() {
            let output = ExecOutput::with_stderr("... depotFile //a\n", "bar - no such file(s).\n");
            assert_eq!(classify_output(output).unwrap(), "... depotFile //a\n");
        }
    }

    #[tokio::test]
    async fn run_once_surfaces_launch_failure() {
        let executor = MockExecutor::new().respond(MockResponse::launch_failure("spawn failed"));
        let err = run_once(&executor, "p4 info", &ExecOptions::new("/ws"))
            .await
            .unwrap_err();
        assert!(matches!(err, P4Error::Launch(_)));
        assert_eq!(executor.command_lines(), vec!["p4 info"]);
    }
}
