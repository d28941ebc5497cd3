//! Construction of Redis-backed lock coordinators.

use std::env;
use std::time::Duration;

use fred::prelude::*;
use lease_lock_core::coordinator::LeaseLockCoordinator;
use lease_lock_core::error::{LockError, LockResult};
use lease_lock_core::options::LockOptions;
use tracing::{debug, instrument};

use crate::store::{map_redis_error, RedisLeaseStore};

/// A lock coordinator on a Redis store using wall-clock time.
pub type RedisLockCoordinator = LeaseLockCoordinator<RedisLeaseStore>;

/// Default Redis host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default Redis port.
pub const DEFAULT_PORT: u16 = 6379;

/// Default limit on a single Redis command round trip.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Builder for [`RedisLockCoordinator`].
///
/// # Example
///
/// ```rust,ignore
/// let coordinator = RedisLockCoordinatorBuilder::new()
///     .host("redis.internal")
///     .port(6379)
///     .lease_duration(Duration::from_secs(30))
///     .build()
///     .await?;
/// ```
pub struct RedisLockCoordinatorBuilder {
    host: String,
    port: u16,
    url: Option<String>,
    client: Option<RedisClient>,
    lease_duration: Option<Duration>,
    poll_interval: Option<Duration>,
    poll_jitter: Duration,
    command_timeout: Duration,
}

impl RedisLockCoordinatorBuilder {
    /// Creates a builder targeting `127.0.0.1:6379`.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            url: None,
            client: None,
            lease_duration: None,
            poll_interval: None,
            poll_jitter: Duration::ZERO,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Reads settings from the environment.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `REDIS_URL` | connection URL, takes precedence over host and port |
    /// | `REDIS_HOST` | server host |
    /// | `REDIS_PORT` | server port |
    /// | `LOCK_LEASE_MS` | lease duration in milliseconds (required) |
    /// | `LOCK_POLL_MS` | poll interval in milliseconds, `0` for a tenth of the lease |
    /// | `REDIS_COMMAND_TIMEOUT_MS` | command timeout in milliseconds, `0` to wait forever |
    pub fn from_env() -> LockResult<Self> {
        let mut builder = Self::new();

        if let Ok(url) = env::var("REDIS_URL") {
            builder = builder.url(url);
        }
        if let Ok(host) = env::var("REDIS_HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = parse_env::<u16>("REDIS_PORT")? {
            builder = builder.port(port);
        }

        let lease_ms = parse_env::<u64>("LOCK_LEASE_MS")?
            .ok_or_else(|| LockError::InvalidConfig("LOCK_LEASE_MS must be set".to_string()))?;
        builder = builder.lease_duration(Duration::from_millis(lease_ms));

        if let Some(poll_ms) = parse_env::<u64>("LOCK_POLL_MS")? {
            builder = builder.poll_interval(Duration::from_millis(poll_ms));
        }
        if let Some(timeout_ms) = parse_env::<u64>("REDIS_COMMAND_TIMEOUT_MS")? {
            builder = builder.command_timeout(Duration::from_millis(timeout_ms));
        }

        Ok(builder)
    }

    /// Sets the Redis host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the Redis port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Connects with a full URL such as `redis://:secret@host:6380/2`.
    ///
    /// Overrides host and port.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Uses an existing client instead of opening a connection.
    pub fn client(mut self, client: RedisClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the lease duration. Required.
    pub fn lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = Some(lease_duration);
        self
    }

    /// Sets the wait between blocking acquire attempts.
    ///
    /// Zero means one tenth of the lease duration.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }

    /// Adds up to `jitter` of random delay to each wait.
    pub fn poll_jitter(mut self, jitter: Duration) -> Self {
        self.poll_jitter = jitter;
        self
    }

    /// Limits how long a single store command may wait for its reply.
    ///
    /// A command that runs over fails with [`LockError::Connection`]. Zero
    /// disables the limit. Ignored when an existing client is supplied.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Returns the URL the builder would connect to.
    pub fn endpoint(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None if self.host.contains(':') => format!("redis://[{}]:{}", self.host, self.port),
            None => format!("redis://{}:{}", self.host, self.port),
        }
    }

    fn options(&self) -> LockResult<LockOptions> {
        let mut options = LockOptions::builder().poll_jitter(self.poll_jitter);
        if let Some(lease_duration) = self.lease_duration {
            options = options.lease_duration(lease_duration);
        }
        if let Some(poll_interval) = self.poll_interval {
            options = options.poll_interval(poll_interval);
        }
        options.build()
    }

    /// Connects and builds the coordinator.
    #[instrument(skip(self), fields(endpoint = %self.endpoint(), backend = "redis"))]
    pub async fn build(self) -> LockResult<RedisLockCoordinator> {
        let options = self.options()?;
        let endpoint = self.endpoint();

        let client = match self.client {
            Some(client) => client,
            None => connect_client(&endpoint, self.command_timeout).await?,
        };
        debug!(
            lease_ms = options.lease_duration().as_millis() as u64,
            poll_ms = options.poll_interval().as_millis() as u64,
            "Redis lock coordinator ready"
        );

        Ok(LeaseLockCoordinator::new(RedisLeaseStore::new(client), options))
    }
}

impl Default for RedisLockCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Connects to `host:port` with the given lease duration and default polling.
pub async fn connect(
    host: impl Into<String>,
    port: u16,
    lease_duration: Duration,
) -> LockResult<RedisLockCoordinator> {
    RedisLockCoordinatorBuilder::new()
        .host(host)
        .port(port)
        .lease_duration(lease_duration)
        .build()
        .await
}

async fn connect_client(url: &str, command_timeout: Duration) -> LockResult<RedisClient> {
    let config = RedisConfig::from_url(url).map_err(|e| {
        LockError::Connection(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid Redis URL: {}", e),
        )))
    })?;

    // Failures surface to the caller; the lock protocol never retries commands.
    let connection = ConnectionConfig {
        max_command_attempts: 1,
        ..Default::default()
    };

    let performance = PerformanceConfig {
        default_command_timeout: command_timeout,
        ..Default::default()
    };

    let client = RedisClient::new(config, Some(performance), Some(connection), None);
    client.connect();
    client
        .wait_for_connect()
        .await
        .map_err(|e| map_redis_error("connect", e))?;

    Ok(client)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> LockResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| LockError::InvalidConfig(format!("{} is not valid: {:?}", name, raw))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(LockError::InvalidConfig(format!(
            "{} is not valid unicode",
            name
        ))),
    }
}
