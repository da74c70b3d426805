//! Durable credential storage.
//!
//! The [`CredentialStore`] keeps one opaque token per authenticated domain
//! under a domain-specific key, so admin and account tokens never collide.
//! It does no validation of the token's shape and never fails: when the
//! backend is unavailable the session simply behaves as logged out.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use realmgate_protocol::Domain;
use serde_json::{Map, Value};

use crate::SessionError;

/// Storage key for the admin-realm token.
pub const ADMIN_TOKEN_KEY: &str = "gm_admin_token";

/// Storage key for the account-realm token.
pub const ACCOUNT_TOKEN_KEY: &str = "ow_account_token";

// ---------------------------------------------------------------------------
// StorageBackend
// ---------------------------------------------------------------------------

/// A durable key → string map (the role `localStorage` plays in a browser).
pub trait StorageBackend: Send + Sync + 'static {
    /// Reads a value. `Ok(None)` if the key isn't set.
    fn load(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Writes a value, replacing any previous one.
    fn save(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Deletes a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// In-process storage. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// Every operation re-reads the file, so two processes pointed at the same
/// path see each other's writes on their next read (no live sync).
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Uses the file at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(SessionError::Storage(e.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|e| SessionError::Storage(e.to_string()))
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), SessionError> {
        let raw = serde_json::to_string_pretty(map).map_err(|e| SessionError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| SessionError::Storage(e.to_string()))
    }
}

impl StorageBackend for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock();
        let map = self.read_map()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// A backend that always fails, like a browser with storage disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn load(&self, _key: &str) -> Result<Option<String>, SessionError> {
        Err(SessionError::Storage("storage disabled".into()))
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), SessionError> {
        Err(SessionError::Storage("storage disabled".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), SessionError> {
        Err(SessionError::Storage("storage disabled".into()))
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Per-domain token slots over a shared [`StorageBackend`].
///
/// Cheap to clone; every clone talks to the same backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn StorageBackend>,
}

impl CredentialStore {
    /// Wraps a backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// A store over fresh [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// The storage key for a domain. `None` for the public domain.
    pub fn key(domain: Domain) -> Option<&'static str> {
        match domain {
            Domain::Admin => Some(ADMIN_TOKEN_KEY),
            Domain::Account => Some(ACCOUNT_TOKEN_KEY),
            Domain::Public => None,
        }
    }

    /// Reads the token for `domain`. Empty strings read as absent.
    pub fn get(&self, domain: Domain) -> Option<String> {
        let key = Self::key(domain)?;
        match self.backend.load(key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(%domain, error = %e, "credential read failed, treating as logged out");
                None
            }
        }
    }

    /// Stores the token for `domain`. An empty token clears the slot.
    pub fn set(&self, domain: Domain, token: &str) {
        if token.is_empty() {
            self.clear(domain);
            return;
        }
        let Some(key) = Self::key(domain) else {
            return;
        };
        if let Err(e) = self.backend.save(key, token) {
            tracing::warn!(%domain, error = %e, "credential write failed");
        }
    }

    /// Removes the token for `domain`.
    pub fn clear(&self, domain: Domain) {
        let Some(key) = Self::key(domain) else {
            return;
        };
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(%domain, error = %e, "credential clear failed");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("realmgate-store-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_get_unset_domain_returns_none() {
        let store = CredentialStore::in_memory();
        assert_eq!(store.get(Domain::Admin), None);
    }

    #[test]
    fn test_set_then_get_returns_token() {
        let store = CredentialStore::in_memory();
        store.set(Domain::Admin, "adm-1");
        assert_eq!(store.get(Domain::Admin).as_deref(), Some("adm-1"));
    }

    #[test]
    fn test_domains_use_separate_slots() {
        let store = CredentialStore::in_memory();
        store.set(Domain::Admin, "adm-1");
        store.set(Domain::Account, "acc-1");

        store.clear(Domain::Admin);

        assert_eq!(store.get(Domain::Admin), None);
        assert_eq!(store.get(Domain::Account).as_deref(), Some("acc-1"));
    }

    #[test]
    fn test_set_empty_token_clears_slot() {
        let store = CredentialStore::in_memory();
        store.set(Domain::Account, "acc-1");
        store.set(Domain::Account, "");
        assert_eq!(store.get(Domain::Account), None);
    }

    #[test]
    fn test_public_domain_has_no_slot() {
        let store = CredentialStore::in_memory();
        store.set(Domain::Public, "ignored");
        assert_eq!(store.get(Domain::Public), None);
        assert_eq!(CredentialStore::key(Domain::Public), None);
    }

    #[test]
    fn test_unavailable_storage_degrades_to_logged_out() {
        let store = CredentialStore::new(Arc::new(UnavailableStorage));
        store.set(Domain::Admin, "adm-1");
        store.clear(Domain::Admin);
        assert_eq!(store.get(Domain::Admin), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let path = temp_path("persist");
        let _ = std::fs::remove_file(&path);

        let first = CredentialStore::new(Arc::new(FileStorage::new(&path)));
        first.set(Domain::Admin, "adm-1");
        first.set(Domain::Account, "acc-1");

        // A fresh store over the same file is a cold start.
        let second = CredentialStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(second.get(Domain::Admin).as_deref(), Some("adm-1"));
        assert_eq!(second.get(Domain::Account).as_deref(), Some("acc-1"));

        second.clear(Domain::Admin);
        assert_eq!(first.get(Domain::Admin), None);
        assert_eq!(first.get(Domain::Account).as_deref(), Some("acc-1"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_storage_corrupt_file_reads_as_logged_out() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{ definitely not json").expect("should write fixture");

        let store = CredentialStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(store.get(Domain::Admin), None);

        let _ = std::fs::remove_file(&path);
    }
}
