//! Lease record encoding.
//!
//! A lease record is the decimal string form of an absolute expiry time in
//! milliseconds since the Unix epoch. No holder identity is stored.

use std::fmt;
use std::time::Duration;

use crate::error::{LockError, LockResult};

/// Expiry timestamp of a lease, in milliseconds since the Unix epoch.
///
/// Returned by a successful acquisition and passed back to `release`. It is
/// the only token the holder has; it does not prove exclusive ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeaseExpiry(u64);

impl LeaseExpiry {
    /// Wraps a raw millisecond timestamp.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Expiry for a lease taken at `now_millis`: `now + lease_duration + 1`.
    pub fn after(now_millis: u64, lease_duration: Duration) -> Self {
        let lease_millis = u64::try_from(lease_duration.as_millis()).unwrap_or(u64::MAX);
        Self(now_millis.saturating_add(lease_millis).saturating_add(1))
    }

    /// Returns the timestamp in milliseconds since the epoch.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// True when `now_millis` is strictly past the expiry.
    pub fn is_elapsed_at(&self, now_millis: u64) -> bool {
        now_millis > self.0
    }

    /// True when the expiry is strictly after `now_millis`.
    ///
    /// At the exact expiry instant a lease is neither live nor elapsed.
    pub fn is_live_at(&self, now_millis: u64) -> bool {
        self.0 > now_millis
    }

    /// Encodes the lease as the string stored under the lock key.
    pub fn encode(&self) -> String {
        self.0.to_string()
    }

    /// Decodes a stored lease value.
    ///
    /// Absent, empty and whitespace-only values mean "no lease" and decode to
    /// `None`. Anything else must be a decimal `u64`.
    pub fn decode(key: &str, raw: Option<&str>) -> LockResult<Option<Self>> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse::<u64>()
            .map(|millis| Some(Self(millis)))
            .map_err(|_| LockError::CorruptLease {
                key: key.to_string(),
                value: raw.to_string(),
            })
    }
}

impl fmt::Display for LeaseExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
