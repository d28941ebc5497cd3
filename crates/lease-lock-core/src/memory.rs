//! In-process [`LeaseStore`] backed by a shared hash map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::LockResult;
use crate::store::LeaseStore;

/// A [`LeaseStore`] that lives in process memory.
///
/// Clones share the same map, so several coordinators built on clones of one
/// store contend exactly as remote processes would on a real store. Useful for
/// tests and for locking between tasks of a single process.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaseStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLeaseStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `key = value` unconditionally.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries().insert(key.into(), value.into());
    }

    /// Returns a copy of the value under `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Returns true if `key` exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the guard cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LeaseStore for MemoryLeaseStore {
    async fn set_if_absent(&self, key: &str, value: &str) -> LockResult<bool> {
        let mut entries = self.entries();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        Ok(self.value(key))
    }

    async fn get_and_set(&self, key: &str, value: &str) -> LockResult<Option<String>> {
        Ok(self.entries().insert(key.to_string(), value.to_string()))
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}
