//! p4session - A session-oriented async client for the Perforce `p4` CLI
//!
//! p4session wraps the `p4` command-line client with a per-instance
//! working directory, automatic re-login when a ticket expires, and a
//! parser that turns `fstat` reports into structured records.
//!
//! # Architecture
//!
//! - [`client`] - The `P4` verb surface, command runner, and re-login coordinator
//! - [`report`] - Parser for `p4 -ztag`-style "... key value" report text
//! - [`exec`] - Process execution capability (real shell and scripted mock)
//! - [`core`] - Session state, path resolution, filename escaping, configuration
//!
//! # Correctness Invariants
//!
//! 1. Every call yields exactly one `Result`
//! 2. A command is re-issued at most once, and only after an invalid-ticket failure
//! 3. The working directory is always absolute and normalized
//! 4. Sessions never share mutable state

pub mod client;
pub mod core;
pub mod exec;
pub mod report;
