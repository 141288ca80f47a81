//! core
//!
//! Session state, configuration, and path handling shared by the client.
//!
//! # Modules
//!
//! - [`session`] - Working directory and option overrides per client
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Lexical `cd`-style path resolution
//! - [`naming`] - Perforce filename escaping

pub mod config;
pub mod naming;
pub mod paths;
pub mod session;
