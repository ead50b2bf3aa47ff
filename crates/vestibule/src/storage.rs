//! Persisted key/value storage for session state.
//!
//! The session core persists two small JSON entries: the reduced identity
//! snapshot and the credential pair. Storage is synchronous and lossy by
//! contract: a failed read behaves like a missing entry and a failed write
//! is logged and dropped, so storage trouble can never break sign-in.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Synchronous key/value storage backend.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`. Failures are logged, not surfaced.
    fn put(&self, key: &str, value: &str);

    /// Remove the entry under `key`, if any.
    fn remove(&self, key: &str);
}

/// File-backed storage: one JSON file per key inside a directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read storage entry");
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        if let Err(e) = fs::write(&path, value) {
            warn!(key, error = %e, "failed to write storage entry");
            return;
        }

        // Session files carry credentials; restrict permissions (Unix only)
        #[cfg(unix)]
        {
            let result = fs::metadata(&path).and_then(|m| {
                let mut perms = m.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&path, perms)
            });
            if let Err(e) = result {
                warn!(key, error = %e, "failed to restrict storage permissions");
            }
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(key, error = %e, "failed to remove storage entry");
            }
        }
    }
}

/// In-memory storage, for tests and embedders that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        storage.put("k", "v");
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k");
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.put("session", "{\"a\":1}");
        assert_eq!(storage.get("session").as_deref(), Some("{\"a\":1}"));
        storage.remove("session");
        assert_eq!(storage.get("session"), None);
    }

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get("absent"), None);
        // Removing an absent key is a no-op
        storage.remove("absent");
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.put("session", "secret");

        let path = dir.path().join("session.json");
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
