//! Permission resolution and caching.
//!
//! The server makes the authorization decision; this module only fetches,
//! caches, and interprets the permission strings it returns. Resolution is
//! fail-closed: with nothing cached, every non-wildcard membership query
//! answers `false`.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Error;
use crate::http::{ApiClient, endpoints};

/// Sentinel permission meaning "all permissions granted".
pub const WILDCARD: &str = "*";

/// The authorization-decision result for the current identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub resource_id: String,
    pub role_id: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl PermissionSet {
    /// True if this set grants `permission`, either literally or via the
    /// wildcard sentinel.
    pub fn allows(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == WILDCARD || p == permission)
    }
}

/// Fetches and caches the permission set for the current identity.
///
/// The cache holds at most one set per session; it is cleared whenever the
/// session transitions to unauthenticated.
#[derive(Debug, Default)]
pub struct PermissionResolver {
    cached: RwLock<Option<PermissionSet>>,
}

impl PermissionResolver {
    /// Create a resolver with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the authorization decision, cache it, and return it.
    ///
    /// # Errors
    ///
    /// Returns the transport or protocol error; the caller decides whether
    /// that is fatal. On failure the cache is left untouched.
    #[instrument(skip(self, client, token))]
    pub async fn fetch_and_cache(
        &self,
        client: &ApiClient,
        token: &str,
    ) -> Result<PermissionSet, Error> {
        let set: PermissionSet = client.get_authed(endpoints::PERMISSIONS, token).await?;
        debug!(role = %set.role, count = set.permissions.len(), "cached permission set");
        *self.cached.write().unwrap() = Some(set.clone());
        Ok(set)
    }

    /// Returns the cached set, or `None`, without making a request.
    pub fn cached(&self) -> Option<PermissionSet> {
        self.cached.read().unwrap().clone()
    }

    /// True if the cached set grants `permission`.
    ///
    /// Fail-closed: an empty cache grants nothing.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.cached
            .read()
            .unwrap()
            .as_ref()
            .map(|set| set.allows(permission))
            .unwrap_or(false)
    }

    /// Drop the cached set.
    pub fn clear(&self) {
        *self.cached.write().unwrap() = None;
    }
}
