//! Holder for the current credential pair.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::Storage;

use super::tokens::{AccessToken, RefreshToken};

const CREDENTIALS_KEY: &str = "credentials";

/// Persisted form of the credential pair.
#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Clone)]
struct CredentialPair {
    access: AccessToken,
    refresh: Option<RefreshToken>,
}

/// Exclusive owner of the current access/refresh credential pair.
///
/// The holder is an explicit instance owned by the session manager rather
/// than ambient module state, so tests can construct independent holders.
/// It writes through to the injected [`Storage`] backend so a session can
/// survive a full process restart; a corrupt or missing stored pair loads
/// as empty, never as an error.
///
/// All operations are total functions over the held state.
pub struct CredentialHolder {
    storage: Arc<dyn Storage>,
    pair: RwLock<Option<CredentialPair>>,
}

impl CredentialHolder {
    /// Create a holder over `storage`, rehydrating any persisted pair.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let pair = storage.get(CREDENTIALS_KEY).and_then(|raw| {
            match serde_json::from_str::<StoredCredentials>(&raw) {
                Ok(stored) => Some(CredentialPair {
                    access: AccessToken::new(stored.access_token),
                    refresh: stored.refresh_token.map(RefreshToken::new),
                }),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable stored credentials");
                    None
                }
            }
        });

        Self {
            storage,
            pair: RwLock::new(pair),
        }
    }

    /// Store a new credential pair, replacing any previous one.
    pub fn set(&self, access: AccessToken, refresh: RefreshToken) {
        let pair = CredentialPair {
            access,
            refresh: Some(refresh),
        };
        self.persist(Some(&pair));
        *self.pair.write().unwrap() = Some(pair);
    }

    /// Replace only the access credential, keeping the current refresh
    /// credential. Used after a refresh exchange, which returns no new
    /// refresh credential.
    pub fn set_access(&self, access: AccessToken) {
        let mut guard = self.pair.write().unwrap();
        let refresh = guard.as_ref().and_then(|p| p.refresh.clone());
        let pair = CredentialPair { access, refresh };
        self.persist(Some(&pair));
        *guard = Some(pair);
    }

    /// Returns the current access credential, if any.
    pub fn access(&self) -> Option<AccessToken> {
        self.pair.read().unwrap().as_ref().map(|p| p.access.clone())
    }

    /// Returns the current refresh credential, if any.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.pair
            .read()
            .unwrap()
            .as_ref()
            .and_then(|p| p.refresh.clone())
    }

    /// True if any credential pair is held.
    pub fn has_credentials(&self) -> bool {
        self.pair.read().unwrap().is_some()
    }

    /// Drop the held pair and its persisted copy.
    pub fn clear(&self) {
        self.persist(None);
        *self.pair.write().unwrap() = None;
    }

    fn persist(&self, pair: Option<&CredentialPair>) {
        match pair {
            Some(pair) => {
                let stored = StoredCredentials {
                    access_token: pair.access.as_str().to_string(),
                    refresh_token: pair.refresh.as_ref().map(|t| t.as_str().to_string()),
                };
                match serde_json::to_string(&stored) {
                    Ok(json) => self.storage.put(CREDENTIALS_KEY, &json),
                    Err(e) => warn!(error = %e, "failed to serialize credentials"),
                }
            }
            None => self.storage.remove(CREDENTIALS_KEY),
        }
    }
}

// Custom Debug impl that hides the held tokens
impl fmt::Debug for CredentialHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHolder")
            .field("pair", &"[REDACTED]")
            .finish()
    }
}
