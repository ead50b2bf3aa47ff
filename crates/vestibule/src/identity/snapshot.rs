//! Persisted, size-reduced snapshot of the signed-in identity.
//!
//! The live identity fetch carries the access credential in a request header
//! whose size is bounded by transport limits; the snapshot lets a caller
//! render instantly on restart while a fresh fetch (or its fallback) resolves.

use std::sync::Arc;

use tracing::warn;

use crate::storage::Storage;

use super::Identity;

const SNAPSHOT_KEY: &str = "identity";

/// Cache of the last known identity, persisted through a [`Storage`] backend.
#[derive(Clone)]
pub struct SnapshotCache {
    storage: Arc<dyn Storage>,
}

impl SnapshotCache {
    /// Create a snapshot cache over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Write a size-reduced snapshot of `identity`.
    ///
    /// Personal details are dropped from super-administrator snapshots to
    /// keep the persisted entry small.
    pub fn store(&self, identity: &Identity) {
        let mut snapshot = identity.clone();
        if snapshot.is_super_admin {
            snapshot.details = None;
        }
        match serde_json::to_string(&snapshot) {
            Ok(json) => self.storage.put(SNAPSHOT_KEY, &json),
            Err(e) => warn!(error = %e, "failed to serialize identity snapshot"),
        }
    }

    /// Returns the last snapshot, or `None`.
    ///
    /// Corrupt data yields `None`, never an error.
    pub fn read(&self) -> Option<Identity> {
        let raw = self.storage.get(SNAPSHOT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(error = %e, "discarding unreadable identity snapshot");
                None
            }
        }
    }

    /// Remove the stored snapshot, if any.
    pub fn clear(&self) {
        self.storage.remove(SNAPSHOT_KEY);
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache").finish_non_exhaustive()
    }
}
