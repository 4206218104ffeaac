use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use thiserror::Error;

/// Errors produced by backing-store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackingStoreError {
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Synchronous per-key text storage used as the persistence medium for
/// encrypted records. Semantics match origin-scoped web storage: atomic
/// single-key get/set, last writer wins, no partial writes visible.
pub trait BackingStore: Send + Sync {
    /// Read the raw text stored under `key`, or `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, BackingStoreError>;

    /// Write `value` under `key`, overwriting any existing entry.
    fn set_item(&self, key: &str, value: &str) -> Result<(), BackingStoreError>;

    /// Remove `key` and its value (idempotent).
    fn remove_item(&self, key: &str) -> Result<(), BackingStoreError>;
}

/// In-memory backing store for tests and ephemeral sessions. Clones share
/// the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackingStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryBackingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BackingStore for InMemoryBackingStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackingStoreError> {
        let map = self.inner.lock().map_err(|err| BackingStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        Ok(map.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), BackingStoreError> {
        let mut map = self.inner.lock().map_err(|err| BackingStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), BackingStoreError> {
        let mut map = self.inner.lock().map_err(|err| BackingStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let store = InMemoryBackingStore::new();
        store.set_item("session", "record").expect("set should succeed");
        let value = store.get_item("session").expect("get should succeed");
        assert_eq!(value.as_deref(), Some("record"));
    }

    #[test]
    fn get_missing_key_returns_none() {
        let store = InMemoryBackingStore::new();
        let value = store.get_item("absent").expect("get should succeed");
        assert_eq!(value, None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = InMemoryBackingStore::new();
        store.set_item("k", "first").expect("set");
        store.set_item("k", "second").expect("set again");
        let value = store.get_item("k").expect("get");
        assert_eq!(value.as_deref(), Some("second"));
    }

    #[test]
    fn remove_is_idempotent() {
        let store = InMemoryBackingStore::new();
        store.set_item("k", "v").expect("set");
        store.remove_item("k").expect("remove should succeed");
        store.remove_item("k").expect("remove again should still succeed");
        assert_eq!(store.get_item("k").expect("get"), None);
    }

    #[test]
    fn clones_share_storage() {
        let store = InMemoryBackingStore::new();
        let other = store.clone();
        store.set_item("k", "v").expect("set");
        assert_eq!(other.get_item("k").expect("get").as_deref(), Some("v"));
    }
}
