//! Instrumented lease stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lease_lock_core::error::{LockError, LockResult};
use lease_lock_core::memory::MemoryLeaseStore;
use lease_lock_core::store::LeaseStore;

/// Memory store that records every command and can simulate another process
/// writing between our `GET` and `GETSET`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStore {
    inner: MemoryLeaseStore,
    log: Arc<Mutex<Vec<&'static str>>>,
    write_after_get: Arc<Mutex<Option<String>>>,
}

impl ScriptedStore {
    pub fn new(inner: MemoryLeaseStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    /// The next `GET` returns what is stored, then `value` is written as if
    /// by a competing process.
    pub fn write_after_next_get(&self, value: impl Into<String>) {
        *self.write_after_get.lock().unwrap() = Some(value.into());
    }

    pub fn commands(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|c| **c == command).count()
    }

    fn record(&self, command: &'static str) {
        self.log.lock().unwrap().push(command);
    }
}

impl LeaseStore for ScriptedStore {
    async fn set_if_absent(&self, key: &str, value: &str) -> LockResult<bool> {
        self.record("SETNX");
        self.inner.set_if_absent(key, value).await
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        self.record("GET");
        let value = self.inner.get(key).await?;
        let injected = self.write_after_get.lock().unwrap().take();
        if let Some(injected) = injected {
            self.inner.insert(key, injected);
        }
        Ok(value)
    }

    async fn get_and_set(&self, key: &str, value: &str) -> LockResult<Option<String>> {
        self.record("GETSET");
        self.inner.get_and_set(key, value).await
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        self.record("DEL");
        self.inner.delete(key).await
    }
}

/// Store whose every command fails as if the server were unreachable.
#[derive(Debug, Clone, Default)]
pub struct UnreachableStore {
    calls: Arc<AtomicUsize>,
}

impl UnreachableStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> LockResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LockError::connection("store unreachable"))
    }
}

impl LeaseStore for UnreachableStore {
    async fn set_if_absent(&self, _key: &str, _value: &str) -> LockResult<bool> {
        self.fail()
    }

    async fn get(&self, _key: &str) -> LockResult<Option<String>> {
        self.fail()
    }

    async fn get_and_set(&self, _key: &str, _value: &str) -> LockResult<Option<String>> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> LockResult<()> {
        self.fail()
    }
}
