//! Key-value credential storage.
//!
//! The session only ever reads one entry, [`API_KEY_ENTRY`]. Stores are
//! shared between the session and the host UI, so both sides see a key
//! change immediately.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::CredentialError;

/// Entry name under which the provider API key is stored.
pub const API_KEY_ENTRY: &str = "openai-api-key";

pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    /// Read an entry, treating blank values as absent.
    fn get_non_blank(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self
            .get(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an API key.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .lock()
            .insert(API_KEY_ENTRY.to_string(), key.into());
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_returns_none() {
        let store = MemoryCredentialStore::new();
        assert!(store.get(API_KEY_ENTRY).unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let store = MemoryCredentialStore::new();
        store.set(API_KEY_ENTRY, "sk-test").unwrap();
        assert_eq!(store.get(API_KEY_ENTRY).unwrap().as_deref(), Some("sk-test"));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = MemoryCredentialStore::with_api_key("sk-old");
        store.set(API_KEY_ENTRY, "sk-new").unwrap();
        assert_eq!(store.get(API_KEY_ENTRY).unwrap().as_deref(), Some("sk-new"));
    }

    #[test]
    fn blank_value_counts_as_absent() {
        let store = MemoryCredentialStore::with_api_key("   ");
        assert!(store.get(API_KEY_ENTRY).unwrap().is_some());
        assert!(store.get_non_blank(API_KEY_ENTRY).unwrap().is_none());
    }

    #[test]
    fn non_blank_value_is_trimmed() {
        let store = MemoryCredentialStore::with_api_key(" sk-abc\n");
        assert_eq!(
            store.get_non_blank(API_KEY_ENTRY).unwrap().as_deref(),
            Some("sk-abc")
        );
    }
}
