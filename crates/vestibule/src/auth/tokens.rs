//! Credential token types.

use std::fmt;

/// An access credential for authenticated API requests.
///
/// Access credentials are short-lived bearer tokens used to authenticate
/// requests to the application server.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    /// Create a new access credential.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the token in bytes, used for header-size projection.
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh credential for obtaining new access credentials.
///
/// Refresh credentials are longer-lived and exchanged for new access
/// credentials without requiring re-authentication.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone)]
pub struct RefreshToken(pub(crate) String);

impl RefreshToken {
    /// Create a new refresh credential.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    ///
    /// # Security
    ///
    /// Use only when constructing refresh or logout requests.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}
