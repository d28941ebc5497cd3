//! The key-value store operations the lock protocol is built on.

use std::future::Future;
use std::sync::Arc;

use crate::error::LockResult;

/// A shared key-value store reachable by every process taking part in locking.
///
/// The protocol needs exactly four primitives. Each one must be atomic on the
/// store side; nothing here is retried, so a network failure is returned to
/// the caller as-is.
///
/// Values are lease records (see [`crate::lease::LeaseExpiry`]). A missing key
/// is reported as `None`.
pub trait LeaseStore: Send + Sync {
    /// Creates `key = value` only if `key` does not exist.
    ///
    /// Returns `true` if the key was created.
    fn set_if_absent(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<bool>> + Send;

    /// Reads the current value of `key`.
    fn get(&self, key: &str) -> impl Future<Output = LockResult<Option<String>>> + Send;

    /// Replaces the value of `key` with `value`, returning the previous value.
    fn get_and_set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<Option<String>>> + Send;

    /// Removes `key` if present.
    fn delete(&self, key: &str) -> impl Future<Output = LockResult<()>> + Send;
}

impl<S: LeaseStore> LeaseStore for Arc<S> {
    fn set_if_absent(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<bool>> + Send {
        (**self).set_if_absent(key, value)
    }

    fn get(&self, key: &str) -> impl Future<Output = LockResult<Option<String>>> + Send {
        (**self).get(key)
    }

    fn get_and_set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<Option<String>>> + Send {
        (**self).get_and_set(key, value)
    }

    fn delete(&self, key: &str) -> impl Future<Output = LockResult<()>> + Send {
        (**self).delete(key)
    }
}
