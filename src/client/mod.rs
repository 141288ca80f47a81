//! client
//!
//! The `P4` client: session state plus the verb surface over `p4`.
//!
//! # Architecture
//!
//! ```text
//! verb -> run_command -> reauth coordinator -> runner -> Executor
//!                                                  |
//!            report verbs <- parse_report <- stdout
//! ```
//!
//! - [`runner`] executes one command line and classifies the result
//! - [`reauth`] re-logs in once when the ticket is rejected
//! - [`crate::report`] turns `fstat` output into records
//!
//! # Concurrency
//!
//! Commands borrow the client immutably and snapshot the working directory
//! and options at dispatch. Directory changes need `&mut self`, so they
//! cannot interleave with in-flight commands on the same client. Separate
//! clients share nothing.
//!
//! # Example
//!
//! ```
//! use p4session::client::P4;
//! use p4session::exec::mock::{MockExecutor, MockResponse};
//!
//! # tokio_test::block_on(async {
//! let executor = MockExecutor::new()
//!     .respond(MockResponse::stdout("... depotFile //depot/f.js\n... haveRev 2\n"));
//! let mut p4 = P4::with_executor(executor.clone(), "/ws").unwrap();
//!
//! let rev = p4.have(Some("src/f.js")).await.unwrap();
//! assert_eq!(rev.as_deref(), Some("2"));
//! assert_eq!(p4.pwd().to_str(), Some("/ws/src"));
//! assert_eq!(executor.command_lines(), vec!["p4 fstat f.js"]);
//! # });
//! ```

mod args;
mod credentials;
mod errors;
pub mod reauth;
pub mod runner;

pub use args::{compose_command_line, CommandArgs};
pub use credentials::{CredentialCache, Credentials};
pub use errors::P4Error;

use std::path::Path;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::naming::sanitize_filepath;
use crate::core::session::{ExecDefaults, Session, SessionOption};
use crate::exec::{Executor, ShellExecutor};
use crate::report::{parse_report, Report};

/// Environment variable carrying the password into the login shell.
const PASSWORD_VAR: &str = "PASS";

/// A Perforce client session.
///
/// Owns its working directory, options, configuration, and cached
/// credentials. Nothing is shared between instances except the executor
/// handle, which is stateless in production.
pub struct P4 {
    session: Session,
    executor: Arc<dyn Executor>,
    config: Config,
    defaults: ExecDefaults,
    credentials: CredentialCache,
}

impl std::fmt::Debug for P4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("P4")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl P4 {
    /// Create a client for the process working directory.
    ///
    /// Uses a [`ShellExecutor`] and loads configuration from the default
    /// locations, with the working directory as the workspace root.
    ///
    /// # Errors
    ///
    /// - [`P4Error::WorkingDirectory`] if the process cwd is unavailable
    /// - [`P4Error::Config`] if a config file is malformed
    pub fn new() -> Result<Self, P4Error> {
        let cwd = std::env::current_dir().map_err(P4Error::WorkingDirectory)?;
        let loaded = Config::load(Some(cwd.as_path()))?;
        Ok(Self::with_executor(ShellExecutor::new(), &cwd)?.with_config(loaded.config))
    }

    /// Create a client with an explicit executor and absolute working
    /// directory, using default configuration.
    pub fn with_executor(
        executor: impl Executor + 'static,
        cwd: impl AsRef<Path>,
    ) -> Result<Self, P4Error> {
        Ok(Self {
            session: Session::new(cwd)?,
            executor: Arc::new(executor),
            config: Config::default(),
            defaults: ExecDefaults::default(),
            credentials: CredentialCache::new(),
        })
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.defaults = config.exec_defaults();
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The cached login credentials, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.get()
    }

    // =========================================================================
    // Session State
    // =========================================================================

    /// Change the working directory like `cd`.
    ///
    /// # Example
    ///
    /// ```
    /// use p4session::client::P4;
    /// use p4session::exec::mock::MockExecutor;
    /// use std::path::Path;
    ///
    /// let mut p4 = P4::with_executor(MockExecutor::new(), "/").unwrap();
    /// p4.cd("/dir0").cd("sub");
    /// assert_eq!(p4.pwd(), Path::new("/dir0/sub"));
    /// ```
    pub fn cd(&mut self, dir: impl AsRef<Path>) -> &mut Self {
        self.session.cd(dir);
        self
    }

    /// Merge execution options. A working-directory option is ignored.
    pub fn set_opts(&mut self, opts: impl IntoIterator<Item = SessionOption>) -> &mut Self {
        self.session.set_opts(opts);
        self
    }

    /// The current working directory.
    pub fn pwd(&self) -> &Path {
        self.session.pwd()
    }

    // =========================================================================
    // Raw Execution
    // =========================================================================

    /// Run `p4 <command> <args>` in the working directory.
    ///
    /// On an invalid-ticket failure, logs in with the cached credentials and
    /// retries once (unless `auto_reauth` is disabled).
    pub async fn run_command(
        &self,
        command: &str,
        args: impl Into<CommandArgs>,
    ) -> Result<String, P4Error> {
        let line = compose_command_line(self.config.p4_binary(), command, &args.into());

        reauth::run_with_reauth(
            self.config.auto_reauth(),
            || self.dispatch(&line),
            || self.relogin(),
        )
        .await
    }

    /// Run an arbitrary shell command line in the working directory.
    ///
    /// Nothing is escaped, benign lines are not filtered, and no re-login
    /// is attempted: any diagnostic output is a failure.
    pub async fn run_shell_command(
        &self,
        command: &str,
        args: impl Into<CommandArgs>,
    ) -> Result<String, P4Error> {
        let line = compose_command_line("", command, &args.into());
        self.shell(&line, None).await
    }

    async fn dispatch(&self, line: &str) -> Result<String, P4Error> {
        let options = self.session.exec_options(&self.defaults);
        runner::run_once(self.executor.as_ref(), line, &options).await
    }

    async fn shell(&self, line: &str, password: Option<&str>) -> Result<String, P4Error> {
        let mut options = self.session.exec_options(&self.defaults);
        if let Some(password) = password {
            options
                .env
                .insert(PASSWORD_VAR.to_string(), password.to_string());
        }

        tracing::debug!(command = %line, cwd = %options.cwd.display(), "dispatching shell command");
        let output = self.executor.exec(line, &options).await?;

        if let Some(message) = output.error {
            return Err(P4Error::Execution { message });
        }
        if !output.stderr.is_empty() {
            return Err(P4Error::Diagnostic {
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in, caching the credentials for automatic re-login.
    ///
    /// Runs in the working directory so the workspace's `P4CONFIG` applies.
    /// The password reaches `p4` through the environment, never the command
    /// line.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String, P4Error> {
        self.credentials
            .store(Credentials::new(username, password));
        self.relogin().await
    }

    /// Log in again with the cached credentials.
    ///
    /// Without cached credentials the exchange still runs, with an empty
    /// user and password, and fails through `p4`'s own diagnostics.
    pub async fn relogin(&self) -> Result<String, P4Error> {
        let (username, password) = self
            .credentials
            .get()
            .map(|c| (c.username(), c.password()))
            .unwrap_or_default();

        let line = format!(
            "echo \"${}\" | {} -u \"{}\" login",
            PASSWORD_VAR,
            self.config.p4_binary(),
            username
        );
        self.shell(&line, Some(password)).await
    }

    // =========================================================================
    // File Verbs
    // =========================================================================

    /// `p4 edit` a file.
    pub async fn edit(&self, filepath: &str) -> Result<String, P4Error> {
        require(Some(filepath), "file to edit")?;
        self.run_command("edit", sanitize_filepath(filepath)).await
    }

    /// `p4 add` a file. The path is passed literally.
    pub async fn add(&self, filepath: &str) -> Result<String, P4Error> {
        require(Some(filepath), "file to add")?;
        self.run_command("add", filepath).await
    }

    /// `p4 edit` a file, falling back to `p4 add` if the edit fails.
    pub async fn smart_edit(&self, filepath: &str) -> Result<String, P4Error> {
        match self.edit(filepath).await {
            Ok(out) => Ok(out),
            Err(err) if err.is_precondition() => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "edit failed; trying add");
                self.add(filepath).await
            }
        }
    }

    /// `p4 revert` a file.
    pub async fn revert(&self, filepath: Option<&str>) -> Result<String, P4Error> {
        let filepath = require(filepath, "file to revert")?;
        self.run_command("revert", sanitize_filepath(filepath)).await
    }

    /// `p4 revert -a`: revert files opened for edit but unchanged.
    pub async fn revert_unchanged(&self) -> Result<String, P4Error> {
        self.run_command("revert", "-a").await
    }

    /// `p4 submit` a file with a changelist description.
    pub async fn submit(&self, filepath: &str, description: &str) -> Result<String, P4Error> {
        require(Some(filepath), "file to submit")?;
        let args = vec![
            "-d".to_string(),
            format!("\"{}\"", description),
            sanitize_filepath(filepath),
        ];
        self.run_command("submit", args).await
    }

    /// `p4 sync` a file, or the working directory's mapping when `None`.
    pub async fn sync(&self, filepath: Option<&str>) -> Result<String, P4Error> {
        self.run_command("sync", filepath.map(sanitize_filepath)).await
    }

    /// `p4 sync *`, after changing to `dir` if given.
    pub async fn sync_dir(&mut self, dir: Option<&str>) -> Result<String, P4Error> {
        self.cd_if(dir);
        self.run_command("sync", "*").await
    }

    /// `p4 sync ...`, after changing to `dir` if given.
    pub async fn recursive_sync_dir(&mut self, dir: Option<&str>) -> Result<String, P4Error> {
        self.cd_if(dir);
        self.run_command("sync", "...").await
    }

    // =========================================================================
    // Report Verbs
    // =========================================================================

    /// `p4 fstat` one file.
    ///
    /// Changes to the file's directory first and stats its basename.
    pub async fn stat(&mut self, filepath: Option<&str>) -> Result<Report, P4Error> {
        let filepath = require(filepath, "file to stat")?;

        let path = Path::new(filepath);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.session.cd(parent);
        }
        let basename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(filepath);

        self.report("fstat", sanitize_filepath(basename)).await
    }

    /// The have-revision of one file, via `p4 fstat`.
    ///
    /// Returns `None` when the report is not a single record or the record
    /// has no `haveRev`.
    pub async fn have(&mut self, filepath: Option<&str>) -> Result<Option<String>, P4Error> {
        let filepath = require(filepath, "file to inspect")?;
        let report = self.stat(Some(filepath)).await?;
        Ok(report
            .single()
            .and_then(|record| record.text("haveRev"))
            .map(str::to_string))
    }

    /// `p4 fstat *`, after changing to `dir` if given.
    pub async fn stat_dir(&mut self, dir: Option<&str>) -> Result<Report, P4Error> {
        self.cd_if(dir);
        self.report("fstat", "*").await
    }

    /// `p4 fstat ...`, after changing to `dir` if given.
    pub async fn recursive_stat_dir(&mut self, dir: Option<&str>) -> Result<Report, P4Error> {
        self.cd_if(dir);
        self.report("fstat", "...").await
    }

    async fn report(&self, command: &str, args: impl Into<CommandArgs>) -> Result<Report, P4Error> {
        let out = self.run_command(command, args).await?;
        Ok(parse_report(&out)?)
    }

    fn cd_if(&mut self, dir: Option<&str>) {
        if let Some(dir) = dir.filter(|d| !d.is_empty()) {
            self.session.cd(dir);
        }
    }
}

/// A mandatory path argument, rejecting `None` and the empty string.
fn require<'a>(value: Option<&'a str>, what: &'static str) -> Result<&'a str, P4Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(P4Error::MissingArgument { what })
}
