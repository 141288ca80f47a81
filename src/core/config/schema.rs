//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$P4SESSION_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/p4session/config.toml`
//! 3. `~/.p4session/config.toml` (canonical write location)
//!
//! # Workspace Config
//!
//! Located at `<workspace root>/.p4session/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g., the binary name must
//! be non-empty and `PWD` cannot be overridden).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::session::PWD_VAR;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// p4_binary = "/opt/perforce/bin/p4"
/// shell = "bash"
/// timeout_secs = 120
/// auto_reauth = true
///
/// [env]
/// P4PORT = "ssl:perforce.example.com:1666"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Executable invoked for p4 commands
    pub p4_binary: Option<String>,

    /// Shell interpreting command lines
    pub shell: Option<String>,

    /// Command timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Re-login once and retry when the ticket is invalid
    pub auto_reauth: Option<bool>,

    /// Extra environment variables
    pub env: Option<BTreeMap<String, String>>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_non_empty("p4_binary", self.p4_binary.as_deref())?;
        validate_non_empty("shell", self.shell.as_deref())?;

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        validate_env(self.env.as_ref())
    }
}

/// Workspace configuration.
///
/// # Example
///
/// ```toml
/// p4_binary = "p4"
///
/// [env]
/// P4CLIENT = "alice-main"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Executable override for this workspace
    pub p4_binary: Option<String>,

    /// Extra environment variables, overriding global ones by key
    pub env: Option<BTreeMap<String, String>>,
}

impl WorkspaceConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_non_empty("p4_binary", self.p4_binary.as_deref())?;
        validate_env(self.env.as_ref())
    }
}

fn validate_non_empty(field: &str, value: Option<&str>) -> Result<(), ConfigError> {
    if let Some(value) = value {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "{} cannot be empty",
                field
            )));
        }
    }
    Ok(())
}

fn validate_env(env: Option<&BTreeMap<String, String>>) -> Result<(), ConfigError> {
    for key in env.into_iter().flat_map(|e| e.keys()) {
        if key.is_empty() {
            return Err(ConfigError::InvalidValue(
                "env variable names cannot be empty".to_string(),
            ));
        }
        if key == PWD_VAR {
            return Err(ConfigError::InvalidValue(format!(
                "{} is derived from the working directory and cannot be configured",
                PWD_VAR
            )));
        }
    }
    Ok(())
}
