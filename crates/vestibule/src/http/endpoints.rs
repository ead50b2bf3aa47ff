//! Endpoint paths and request/response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// POST: issue a credential pair from email/password.
pub const LOGIN: &str = "/auth/login";

/// POST: create a new account.
pub const REGISTER: &str = "/auth/register";

/// POST: revoke the refresh credential.
pub const LOGOUT: &str = "/auth/logout";

/// POST: exchange the refresh credential for a new access credential.
pub const REFRESH: &str = "/auth/refresh";

/// GET: the full identity of the current credential.
pub const ME: &str = "/auth/me";

/// GET: the authorization decision for the current identity.
pub const PERMISSIONS: &str = "/auth/permissions";

/// GET: the password rotation audit for the current identity.
pub const PASSWORD_AUDIT: &str = "/auth/password-audit";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Explicit capability flag for the degraded-mode fallback identity,
    /// so super-admin status never has to be guessed from the email.
    #[serde(default)]
    pub is_super_admin: Option<bool>,
}

/// Request body for register.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for logout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest<'a> {
    pub refresh_token: &'a str,
}

/// Request body for refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from refresh. Only a new access credential is issued; the
/// refresh credential stays valid.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Error response body from the server.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
