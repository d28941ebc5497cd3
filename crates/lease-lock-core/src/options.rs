//! Coordinator configuration.

use std::time::Duration;

use crate::error::{LockError, LockResult};

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lower bound on the effective poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Validated lock coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOptions {
    lease_duration: Duration,
    poll_interval: Duration,
    poll_jitter: Duration,
}

impl LockOptions {
    /// Returns a new builder.
    pub fn builder() -> LockOptionsBuilder {
        LockOptionsBuilder::new()
    }

    /// Options with the given lease duration and default polling.
    pub fn with_lease(lease_duration: Duration) -> LockResult<Self> {
        Self::builder().lease_duration(lease_duration).build()
    }

    /// How long a written lease stays valid.
    ///
    /// Must exceed the longest expected critical section; nothing extends a
    /// lease once written.
    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    /// Effective wait between attempts in a blocking acquire.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Upper bound of the random delay added to each wait.
    pub fn poll_jitter(&self) -> Duration {
        self.poll_jitter
    }
}

/// Builder for [`LockOptions`].
#[derive(Debug, Clone, Default)]
pub struct LockOptionsBuilder {
    lease_duration: Option<Duration>,
    poll_interval: Option<Duration>,
    poll_jitter: Duration,
}

impl LockOptionsBuilder {
    /// Creates a builder with no lease duration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lease duration. Required.
    pub fn lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = Some(lease_duration);
        self
    }

    /// Sets the wait between blocking acquire attempts.
    ///
    /// Zero means one tenth of the lease duration. Defaults to 10ms.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }

    /// Adds up to `jitter` of random delay to each wait. Defaults to zero.
    pub fn poll_jitter(mut self, jitter: Duration) -> Self {
        self.poll_jitter = jitter;
        self
    }

    /// Validates and builds the options.
    pub fn build(self) -> LockResult<LockOptions> {
        let lease_duration = self
            .lease_duration
            .ok_or_else(|| LockError::InvalidConfig("lease duration is required".to_string()))?;
        if lease_duration < Duration::from_millis(1) {
            return Err(LockError::InvalidConfig(format!(
                "lease duration must be at least 1ms, got {:?}",
                lease_duration
            )));
        }

        let poll_interval = match self.poll_interval {
            None => DEFAULT_POLL_INTERVAL,
            Some(interval) if interval.is_zero() => lease_duration / 10,
            Some(interval) => interval,
        }
        .max(MIN_POLL_INTERVAL);

        Ok(LockOptions {
            lease_duration,
            poll_interval,
            poll_jitter: self.poll_jitter,
        })
    }
}
