//! client::credentials
//!
//! In-memory cache of the last login credentials.
//!
//! The cache lives and dies with its client. It is filled by every
//! explicit login and read by the automatic re-login path. There is no
//! expiry: a wrong cached password keeps costing one failed login per
//! invalid-ticket failure until the next explicit login replaces it.

use std::fmt;

/// A username/password pair.
///
/// `Debug` output redacts the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password. Do not log it.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Holds the most recent credentials, if any.
#[derive(Debug, Clone, Default)]
pub struct CredentialCache {
    cached: Option<Credentials>,
}

impl CredentialCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached credentials.
    pub fn store(&mut self, credentials: Credentials) {
        self.cached = Some(credentials);
    }

    /// The cached credentials, if any.
    pub fn get(&self) -> Option<&Credentials> {
        self.cached.as_ref()
    }

    /// Forget the cached credentials.
    pub fn clear(&mut self) {
        self.cached = None;
    }
}
