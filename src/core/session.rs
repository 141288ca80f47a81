//! core::session
//!
//! Per-client session state: the working directory and option overrides
//! every dispatched command reads.
//!
//! # Invariants
//!
//! - The working directory is always absolute and normalized.
//! - The working directory changes only through [`Session::cd`]; an
//!   option merge carrying [`SessionOption::Cwd`] is ignored.
//! - Each session owns its state. Nothing is shared between sessions.
//!
//! # Example
//!
//! ```
//! use p4session::core::session::{Session, SessionOption};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let mut session = Session::new("/ws").unwrap();
//! session
//!     .cd("dir0")
//!     .cd("sub")
//!     .set_opts([SessionOption::Timeout(Duration::from_secs(30))]);
//!
//! assert_eq!(session.pwd(), Path::new("/ws/dir0/sub"));
//! assert_eq!(session.timeout(), Some(Duration::from_secs(30)));
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::paths;
use crate::exec::ExecOptions;

/// Environment variable mirroring the working directory for subprocesses.
pub const PWD_VAR: &str = "PWD";

/// Errors from session construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The initial working directory was not absolute.
    #[error("working directory must be absolute: {}", path.display())]
    RelativeCwd {
        /// The rejected path
        path: PathBuf,
    },
}

/// One entry of the option mapping merged by [`Session::set_opts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOption {
    /// Reserved: the working directory has its own operation.
    Cwd(PathBuf),
    /// Replace the process environment used as the base.
    Env(BTreeMap<String, String>),
    /// Kill commands that run longer than this.
    Timeout(Duration),
    /// Shell interpreting command lines.
    Shell(String),
}

impl SessionOption {
    /// The option's key in the mapping.
    pub fn key(&self) -> &'static str {
        match self {
            SessionOption::Cwd(_) => "cwd",
            SessionOption::Env(_) => "env",
            SessionOption::Timeout(_) => "timeout",
            SessionOption::Shell(_) => "shell",
        }
    }
}

/// Execution defaults supplied by configuration.
///
/// Session overrides win over these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecDefaults {
    /// Variables layered over the process environment.
    pub env: BTreeMap<String, String>,
    /// Default command timeout.
    pub timeout: Option<Duration>,
    /// Default shell.
    pub shell: Option<String>,
}

/// Working directory and option overrides for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cwd: PathBuf,
    env: Option<BTreeMap<String, String>>,
    timeout: Option<Duration>,
    shell: Option<String>,
}

impl Session {
    /// Create a session rooted at an absolute directory.
    ///
    /// # Errors
    ///
    /// - [`SessionError::RelativeCwd`] if `cwd` is relative
    pub fn new(cwd: impl AsRef<Path>) -> Result<Self, SessionError> {
        let cwd = cwd.as_ref();
        if !cwd.has_root() {
            return Err(SessionError::RelativeCwd {
                path: cwd.to_path_buf(),
            });
        }

        Ok(Self {
            cwd: paths::normalize(cwd),
            env: None,
            timeout: None,
            shell: None,
        })
    }

    /// Change the working directory like `cd`.
    ///
    /// Relative paths resolve against the current directory; absolute
    /// paths replace it. The result is normalized.
    pub fn cd(&mut self, dir: impl AsRef<Path>) -> &mut Self {
        self.cwd = paths::resolve(&self.cwd, dir);
        self
    }

    /// Merge options into the session.
    ///
    /// Later options replace earlier ones with the same key.
    /// [`SessionOption::Cwd`] is ignored; use [`Session::cd`].
    pub fn set_opts(&mut self, opts: impl IntoIterator<Item = SessionOption>) -> &mut Self {
        for opt in opts {
            match opt {
                SessionOption::Cwd(path) => {
                    tracing::warn!(
                        ignored = %path.display(),
                        "working directory cannot be set through options; use cd"
                    );
                }
                SessionOption::Env(env) => self.env = Some(env),
                SessionOption::Timeout(timeout) => self.timeout = Some(timeout),
                SessionOption::Shell(shell) => self.shell = Some(shell),
            }
        }
        self
    }

    /// Current working directory.
    pub fn pwd(&self) -> &Path {
        &self.cwd
    }

    /// Environment override, if one was set.
    pub fn env_override(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    /// Timeout override, if one was set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Shell override, if one was set.
    pub fn shell(&self) -> Option<&str> {
        self.shell.as_deref()
    }

    /// Snapshot the options for one dispatch.
    ///
    /// Without an environment override the process environment is the
    /// base, with `defaults.env` layered on top. Either way `PWD` is set
    /// to the working directory.
    pub fn exec_options(&self, defaults: &ExecDefaults) -> ExecOptions {
        let mut env = match &self.env {
            Some(env) => env.clone(),
            None => {
                let mut env = process_env();
                env.extend(defaults.env.clone());
                env
            }
        };
        env.insert(PWD_VAR.to_string(), self.cwd.to_string_lossy().into_owned());

        ExecOptions {
            cwd: self.cwd.clone(),
            env,
            timeout: self.timeout.or(defaults.timeout),
            shell: self.shell.clone().or_else(|| defaults.shell.clone()),
        }
    }
}

/// The process environment, skipping entries that are not UTF-8.
pub fn process_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod construction {
        use super::*;

        #[test]
        fn absolute_cwd_is_normalized() {
            let session = Session::new("/ws/./a/../b/").unwrap();
            assert_eq!(session.pwd(), Path::new("/ws/b"));
        }

        #[test]
        fn relative_cwd_rejected() {
            let err = Session::new("ws").unwrap_err();
            assert_eq!(
                err,
                SessionError::RelativeCwd {
                    path: PathBuf::from("ws")
                }
            );
            assert!(err.to_string().contains("absolute"));
        }
    }

    mod cd {
        use super::*;

        #[test]
        fn relative_then_absolute() {
            let mut session = Session::new("/ws").unwrap();
            session.cd("a/b");
            assert_eq!(session.pwd(), Path::new("/ws/a/b"));
            session.cd("/elsewhere");
            assert_eq!(session.pwd(), Path::new("/elsewhere"));
        }

        #[test]
        fn chaining_composes() {
            let mut session = Session::new("/").unwrap();
            session.cd("/dir0").cd("sub");
            assert_eq!(session.pwd(), Path::new("/dir0/sub"));
        }
    }

    mod set_opts {
        use super::*;

        #[test]
        fn cwd_option_is_ignored() {
            let mut session = Session::new("/ws").unwrap();
            session.set_opts([SessionOption::Cwd(PathBuf::from("/hijack"))]);
            assert_eq!(session.pwd(), Path::new("/ws"));
        }

        #[test]
        fn other_options_merge() {
            let mut session = Session::new("/ws").unwrap();
            session
                .set_opts([
                    SessionOption::Cwd(PathBuf::from("/hijack")),
                    SessionOption::Shell("bash".into()),
                ])
                .set_opts([SessionOption::Timeout(Duration::from_secs(5))]);

            assert_eq!(session.pwd(), Path::new("/ws"));
            assert_eq!(session.shell(), Some("bash"));
            assert_eq!(session.timeout(), Some(Duration::from_secs(5)));
            assert!(session.env_override().is_none());
        }

        #[test]
        fn keys() {
            assert_eq!(SessionOption::Cwd(PathBuf::new()).key(), "cwd");
            assert_eq!(SessionOption::Env(BTreeMap::new()).key(), "env");
            assert_eq!(SessionOption::Timeout(Duration::ZERO).key(), "timeout");
            assert_eq!(SessionOption::Shell(String::new()).key(), "shell");
        }
    }

    mod exec_options {
        use super::*;

        #[test]
        fn env_override_gets_pwd() {
            let mut session = Session::new("/ws").unwrap();
            let env = BTreeMap::from([("P4CLIENT".to_string(), "my-ws".to_string())]);
            session.set_opts([SessionOption::Env(env)]);
            session.cd("sub");

            let options = session.exec_options(&ExecDefaults::default());

            assert_eq!(options.cwd, PathBuf::from("/ws/sub"));
            assert_eq!(options.env.len(), 2);
            assert_eq!(options.env["P4CLIENT"], "my-ws");
            assert_eq!(options.env[PWD_VAR], "/ws/sub");
        }

        #[test]
        fn defaults_layer_over_process_env() {
            let session = Session::new("/ws").unwrap();
            let defaults = ExecDefaults {
                env: BTreeMap::from([("P4PORT".to_string(), "ssl:perforce:1666".to_string())]),
                timeout: Some(Duration::from_secs(9)),
                shell: Some("bash".into()),
            };

            let options = session.exec_options(&defaults);

            assert_eq!(options.env["P4PORT"], "ssl:perforce:1666");
            assert_eq!(options.env[PWD_VAR], "/ws");
            assert_eq!(options.timeout, Some(Duration::from_secs(9)));
            assert_eq!(options.shell.as_deref(), Some("bash"));
        }

        #[test]
        fn override_ignores_default_env() {
            let mut session = Session::new("/ws").unwrap();
            session.set_opts([
                SessionOption::Env(BTreeMap::new()),
                SessionOption::Timeout(Duration::from_secs(1)),
            ]);
            let defaults = ExecDefaults {
                env: BTreeMap::from([("P4PORT".to_string(), "x".to_string())]),
                timeout: Some(Duration::from_secs(9)),
                shell: None,
            };

            let options = session.exec_options(&defaults);

            assert!(!options.env.contains_key("P4PORT"));
            assert_eq!(options.timeout, Some(Duration::from_secs(1)));
        }

        #[test]
        fn sessions_do_not_share_state() {
            let mut a = Session::new("/ws").unwrap();
            let b = Session::new("/ws").unwrap();
            a.cd("x");
            assert_eq!(a.pwd(), Path::new("/ws/x"));
            assert_eq!(b.pwd(), Path::new("/ws"));
        }
    }
}
