//! client::errors
//!
//! Error taxonomy for client operations.
//!
//! # Design
//!
//! Every failure of a single command invocation is one [`P4Error`]. None is
//! fatal to the process. Only [`P4Error::AuthInvalid`] is ever handled
//! internally (by one re-login and retry); all other variants reach the
//! caller unchanged.
//!
//! # Security
//!
//! Error messages never include passwords. The login password is passed
//! to the subprocess through its environment, never on the command line.
//!
//! # Example
//!
//! ```
//! use p4session::client::P4Error;
//!
//! let err = P4Error::MissingArgument { what: "file to stat" };
//! assert_eq!(err.to_string(), "please pass a file to stat");
//! assert!(!err.is_auth_failure());
//! ```

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::session::SessionError;
use crate::exec::ExecError;
use crate::report::ReportError;

/// Errors from client operations.
#[derive(Debug, Error)]
pub enum P4Error {
    /// The executor could not start the subprocess.
    #[error(transparent)]
    Launch(#[from] ExecError),

    /// The executor reported an abnormal completion.
    #[error("{message}")]
    Execution {
        /// The executor's message, verbatim
        message: String,
    },

    /// The command wrote diagnostics that are not known to be benign.
    #[error("{stderr}")]
    Diagnostic {
        /// Diagnostic text after benign lines were filtered out
        stderr: String,
    },

    /// The server rejected the session's ticket.
    #[error("{stderr}")]
    AuthInvalid {
        /// The diagnostic text that matched the signature
        stderr: String,
    },

    /// A report-producing command printed malformed report text.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A mandatory argument was not supplied; nothing was executed.
    #[error("please pass a {what}")]
    MissingArgument {
        /// What the caller should have passed
        what: &'static str,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The session could not be created.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The process working directory could not be determined.
    #[error("cannot determine working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),
}

impl P4Error {
    /// Check if this error is the invalid-ticket signature.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, P4Error::AuthInvalid { .. })
    }

    /// Check if the failure happened before anything was executed.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            P4Error::MissingArgument { .. }
                | P4Error::Config(_)
                | P4Error::Session(_)
                | P4Error::WorkingDirectory(_)
        )
    }

    /// Diagnostic text carried by the error, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            P4Error::Diagnostic { stderr } | P4Error::AuthInvalid { stderr } => Some(stderr),
            _ => None,
        }
    }
}
