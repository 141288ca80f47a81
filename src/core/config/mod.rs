//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! p4session has two configuration scopes:
//! - **Global**: User-level settings
//! - **Workspace**: Per client-workspace overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Workspace config file
//! 4. Session options set at runtime (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$P4SESSION_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/p4session/config.toml`
//! 3. `~/.p4session/config.toml` (canonical write location)
//!
//! # Workspace Config Location
//!
//! `<workspace root>/.p4session/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use p4session::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/workspace"))).unwrap();
//! let config = result.config;
//!
//! println!("Binary: {}", config.p4_binary());
//! println!("Auto re-login: {}", config.auto_reauth());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, WorkspaceConfig};

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::session::ExecDefaults;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV_VAR: &str = "P4SESSION_CONFIG";

/// Default executable for p4 commands.
pub const DEFAULT_P4_BINARY: &str = "p4";

/// Errors from loading or persisting p4session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read p4session config {}: {source}", path.display())]
    ReadError {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A config file is not valid TOML or has unknown keys.
    #[error("malformed p4session config {}: {message}", path.display())]
    ParseError {
        /// File that failed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A config file or its temp file could not be written.
    #[error("cannot write p4session config {}: {source}", path.display())]
    WriteError {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A value parsed but is out of range (empty binary, zero timeout,
    /// reserved env key).
    #[error("invalid p4session setting: {0}")]
    InvalidValue(String),

    /// No home directory to hold `~/.p4session/config.toml`.
    #[error("no home directory for the global p4session config")]
    NoHomeDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Paths that were read, global first.
    pub sources: Vec<PathBuf>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: workspace config overrides global config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Workspace configuration (if found)
    pub workspace: Option<WorkspaceConfig>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `workspace_root` is provided, also loads workspace config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(workspace_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), workspace_root)
    }

    /// Load configuration from an explicit global file and workspace root.
    pub fn load_from(
        global_path: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut sources = Vec::new();

        let global = match global_path {
            Some(path) if path.exists() => {
                sources.push(path.to_path_buf());
                read_toml::<GlobalConfig>(path)?
            }
            _ => GlobalConfig::default(),
        };

        let workspace = match workspace_root.map(Self::workspace_config_path) {
            Some(path) if path.exists() => {
                let config = read_toml::<WorkspaceConfig>(&path)?;
                sources.push(path);
                Some(config)
            }
            _ => None,
        };

        global.validate()?;
        if let Some(ref w) = workspace {
            w.validate()?;
        }

        tracing::debug!(sources = ?sources, "loaded configuration");

        Ok(ConfigLoadResult {
            config: Config { global, workspace },
            sources,
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $P4SESSION_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/p4session/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("p4session/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.p4session/config.toml
        let path = Self::global_config_path().ok()?;
        path.exists().then_some(path)
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.p4session/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".p4session/config.toml"))
    }

    /// Get the path for workspace config under `root`.
    pub fn workspace_config_path(root: &Path) -> PathBuf {
        root.join(".p4session/config.toml")
    }

    /// Write global config atomically.
    pub fn write_global(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write workspace config atomically.
    pub fn write_workspace(root: &Path, config: &WorkspaceConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::workspace_config_path(root);
        write_config_atomic(&path, config)?;
        Ok(path)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the p4 executable.
    ///
    /// Defaults to "p4" if not configured.
    pub fn p4_binary(&self) -> &str {
        self.workspace
            .as_ref()
            .and_then(|w| w.p4_binary.as_deref())
            .or(self.global.p4_binary.as_deref())
            .unwrap_or(DEFAULT_P4_BINARY)
    }

    /// Get the configured shell, if any.
    pub fn shell(&self) -> Option<&str> {
        self.global.shell.as_deref()
    }

    /// Get the configured command timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.global.timeout_secs.map(Duration::from_secs)
    }

    /// Check if automatic re-login is enabled.
    ///
    /// Defaults to `true` if not configured.
    pub fn auto_reauth(&self) -> bool {
        self.global.auto_reauth.unwrap_or(true)
    }

    /// Extra environment variables, workspace values overriding global ones.
    pub fn env(&self) -> BTreeMap<String, String> {
        let mut env = self.global.env.clone().unwrap_or_default();
        if let Some(workspace_env) = self.workspace.as_ref().and_then(|w| w.env.as_ref()) {
            env.extend(workspace_env.clone());
        }
        env
    }

    /// Execution defaults derived from this configuration.
    pub fn exec_defaults(&self) -> ExecDefaults {
        ExecDefaults {
            env: self.env(),
            timeout: self.timeout(),
            shell: self.shell().map(str::to_string),
        }
    }
}

/// Parse one TOML config file into its schema.
fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Persist a config file through a sibling `.toml.tmp` and a rename.
///
/// Readers see either the previous file or the complete new one.
fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let write_err = |at: &Path| {
        let at = at.to_path_buf();
        move |source| ConfigError::WriteError { path: at, source }
    };

    let text =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(write_err(path))?;
    }

    let staging = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&staging).map_err(write_err(&staging))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(write_err(&staging))?;

    fs::rename(&staging, path).map_err(write_err(path))
}
