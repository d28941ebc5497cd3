//! Redis implementation of the lease store primitives.

use fred::prelude::*;
use lease_lock_core::error::{LockError, LockResult};
use lease_lock_core::store::LeaseStore;
use tracing::trace;

/// A [`LeaseStore`] backed by a single Redis server.
///
/// | Primitive | Command |
/// |---|---|
/// | set-if-absent | `SET key value NX` |
/// | get | `GET key` |
/// | get-and-set | `GETSET key value` |
/// | delete | `DEL key` |
///
/// The client is multiplexed and shared by every call; cloning the store
/// shares the connection.
#[derive(Clone)]
pub struct RedisLeaseStore {
    client: RedisClient,
}

impl RedisLeaseStore {
    /// Wraps a connected client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

impl std::fmt::Debug for RedisLeaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLeaseStore")
            .field("client", &self.client.id())
            .finish()
    }
}

/// Maps a client error onto the lock error taxonomy.
pub(crate) fn map_redis_error(command: &str, err: RedisError) -> LockError {
    match err.kind() {
        RedisErrorKind::IO | RedisErrorKind::Timeout | RedisErrorKind::Canceled => {
            LockError::connection(format!("Redis {} failed: {}", command, err))
        }
        _ => LockError::Backend(Box::new(err)),
    }
}

impl LeaseStore for RedisLeaseStore {
    async fn set_if_absent(&self, key: &str, value: &str) -> LockResult<bool> {
        // SET NX replies OK when the key was written and nil when it already existed
        let result: Option<String> = self
            .client
            .set(key, value, None, Some(SetOptions::NX), false)
            .await
            .map_err(|e| map_redis_error("SET NX", e))?;
        trace!(key, created = result.is_some(), "SET NX");
        Ok(result.is_some())
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        self.client
            .get::<Option<String>, _>(key)
            .await
            .map_err(|e| map_redis_error("GET", e))
    }

    async fn get_and_set(&self, key: &str, value: &str) -> LockResult<Option<String>> {
        self.client
            .getset::<Option<String>, _, _>(key, value)
            .await
            .map_err(|e| map_redis_error("GETSET", e))
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        let _: i64 = self
            .client
            .del(key)
            .await
            .map_err(|e| map_redis_error("DEL", e))?;
        Ok(())
    }
}
