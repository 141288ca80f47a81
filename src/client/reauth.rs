//! client::reauth
//!
//! Automatic re-login when a ticket expires mid-session.
//!
//! # State Machine
//!
//! ```text
//! Normal --(AuthInvalid)--> login --ok--> Retrying --(any outcome)--> caller
//!                             \--err--> caller (login error)
//! Normal --(anything else)--> caller
//! ```
//!
//! A command is attempted at most twice, and the login runs at most once
//! per original call: the `Retrying` state never intercepts, so a ticket
//! that is still rejected after login surfaces as-is.

use std::future::Future;

use super::errors::P4Error;

/// Where a call is in the re-login cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthState {
    /// First attempt; an invalid ticket triggers a login.
    Normal,
    /// Second attempt after login; nothing is intercepted.
    Retrying,
}

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Hand the error to the caller.
    Surface,
    /// Log in, then retry the original command.
    LoginAndRetry,
}

impl ReauthState {
    /// Decide the next step after an attempt failed with `err`.
    pub fn on_failure(self, err: &P4Error, enabled: bool) -> Transition {
        match self {
            ReauthState::Normal if enabled && err.is_auth_failure() => Transition::LoginAndRetry,
            _ => Transition::Surface,
        }
    }
}

/// Run `attempt`, logging in and retrying once on an invalid ticket.
///
/// A login failure replaces the original command's failure.
pub async fn run_with_reauth<T, A, AF, L, LF>(
    enabled: bool,
    mut attempt: A,
    mut login: L,
) -> Result<T, P4Error>
where
    A: FnMut() -> AF,
    AF: Future<Output = Result<T, P4Error>>,
    L: FnMut() -> LF,
    LF: Future<Output = Result<String, P4Error>>,
{
    let mut state = ReauthState::Normal;

    loop {
        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match state.on_failure(&err, enabled) {
            Transition::Surface => return Err(err),
            Transition::LoginAndRetry => {
                tracing::warn!("ticket invalid or unset; logging in again and retrying once");
                login().await?;
                state = ReauthState::Retrying;
            }
        }
    }
}
