//! The lease lock protocol.
//!
//! A lock is a key in a shared store whose value is the expiry timestamp of
//! the current lease. Acquiring creates the key with `SET-IF-ABSENT`, or, when
//! the stored lease has already expired, takes it over with `GET-AND-SET` and
//! re-checks the value it replaced. Releasing deletes the key while a live
//! lease is recorded.
//!
//! # Consistency
//!
//! The takeover path is a read, swap and re-check, not a true compare-and-swap.
//! Two processes that read the same stale lease both swap; the loser of the
//! race overwrites the winner's record with its own expiry, and if their clocks
//! disagree the loser can judge the winner's fresh lease expired and also
//! report success. Release checks only that *some* lease is live, not that it
//! is the caller's. Both behaviours are part of the protocol; callers needing
//! strict exclusion must use fencing on the protected resource itself.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, field, instrument, trace, Span};

use crate::clock::{Clock, SystemClock};
use crate::error::{LockError, LockResult};
use crate::lease::LeaseExpiry;
use crate::options::LockOptions;
use crate::store::LeaseStore;

/// Coordinates lease locks on a shared [`LeaseStore`].
///
/// Holds nothing but configuration: every call goes to the store, so two
/// coordinators in one process behave like two remote processes. There is no
/// in-process serialization of calls for the same key.
///
/// # Example
///
/// ```rust,ignore
/// let coordinator = LeaseLockCoordinator::new(store, LockOptions::with_lease(lease)?);
///
/// let lease = coordinator.acquire("nightly-report").await?;
/// generate_report().await;
/// coordinator.release("nightly-report", lease).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LeaseLockCoordinator<S, C = SystemClock> {
    store: S,
    clock: C,
    options: LockOptions,
}

impl<S: LeaseStore> LeaseLockCoordinator<S> {
    /// Creates a coordinator using wall-clock time.
    pub fn new(store: S, options: LockOptions) -> Self {
        Self::with_clock(store, SystemClock, options)
    }
}

impl<S: LeaseStore, C: Clock> LeaseLockCoordinator<S, C> {
    /// Creates a coordinator with a custom time source.
    pub fn with_clock(store: S, clock: C, options: LockOptions) -> Self {
        Self {
            store,
            clock,
            options,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the coordinator options.
    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    /// Attempts to take the lock once, without waiting.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(lease))` - Lock acquired; keep `lease` for [`release`](Self::release)
    /// * `Ok(None)` - A live lease is held by someone else
    /// * `Err(...)` - The store failed or holds a corrupt lease record
    #[instrument(skip_all, fields(lock.key = %key, acquired = field::Empty))]
    pub async fn try_acquire(&self, key: &str) -> LockResult<Option<LeaseExpiry>> {
        let lease = self.attempt(key).await?;
        Span::current().record("acquired", lease.is_some());
        Ok(lease)
    }

    /// Takes the lock, polling until it is free.
    ///
    /// There is no deadline: the call returns only once the lock is acquired,
    /// a store error occurs, or the future is dropped.
    #[instrument(skip_all, fields(lock.key = %key, attempts = field::Empty))]
    pub async fn acquire(&self, key: &str) -> LockResult<LeaseExpiry> {
        self.acquire_loop(key, None).await
    }

    /// Like [`acquire`](Self::acquire), but gives up with
    /// [`LockError::Cancelled`] once `cancel` holds `true`.
    ///
    /// The flag is checked before every attempt and raced against every wait.
    /// If the sender is dropped the call keeps polling uncancellably.
    #[instrument(skip_all, fields(lock.key = %key, attempts = field::Empty))]
    pub async fn acquire_with_cancel(
        &self,
        key: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> LockResult<LeaseExpiry> {
        self.acquire_loop(key, Some(&mut cancel)).await
    }

    /// Like [`acquire`](Self::acquire), but fails with
    /// [`LockError::Timeout`] if the lock is not taken within `timeout`.
    #[instrument(skip_all, fields(lock.key = %key, timeout = ?timeout, attempts = field::Empty))]
    pub async fn acquire_timeout(&self, key: &str, timeout: Duration) -> LockResult<LeaseExpiry> {
        match tokio::time::timeout(timeout, self.acquire_loop(key, None)).await {
            Ok(result) => result,
            Err(_) => {
                debug!("gave up waiting for lock");
                Err(LockError::Timeout(timeout))
            }
        }
    }

    /// Releases a lease obtained from this key.
    ///
    /// Does nothing when `lease` has already expired by this process's clock,
    /// since the key may by now belong to a later holder. Otherwise the key is
    /// deleted if the store shows any live lease.
    #[instrument(skip_all, fields(lock.key = %key, lease = %lease))]
    pub async fn release(&self, key: &str, lease: LeaseExpiry) -> LockResult<()> {
        if lease.is_elapsed_at(self.clock.now_millis()) {
            debug!("own lease already expired, leaving key untouched");
            return Ok(());
        }

        let raw = self.store.get(key).await?;
        match LeaseExpiry::decode(key, raw.as_deref())? {
            Some(current) if current.is_live_at(self.clock.now_millis()) => {
                self.store.delete(key).await?;
                debug!(current = %current, "lock released");
            }
            current => {
                debug!(current = ?current.map(|c| c.as_millis()), "no live lease to release");
            }
        }
        Ok(())
    }

    async fn acquire_loop(
        &self,
        key: &str,
        mut cancel: Option<&mut watch::Receiver<bool>>,
    ) -> LockResult<LeaseExpiry> {
        let mut attempts: u64 = 0;
        loop {
            if let Some(cancel) = cancel.as_deref() {
                if *cancel.borrow() {
                    return Err(LockError::Cancelled);
                }
            }

            attempts += 1;
            if let Some(lease) = self.attempt(key).await? {
                Span::current().record("attempts", attempts);
                return Ok(lease);
            }

            let wait = self.next_wait();
            trace!(attempts, wait_ms = wait.as_millis() as u64, "lock busy, waiting");
            match cancel.as_deref_mut() {
                Some(cancel) => wait_or_cancel(wait, cancel).await?,
                None => tokio::time::sleep(wait).await,
            }
        }
    }

    /// One pass of the acquisition protocol.
    async fn attempt(&self, key: &str) -> LockResult<Option<LeaseExpiry>> {
        let candidate = self.candidate();
        if self.store.set_if_absent(key, &candidate.encode()).await? {
            debug!(lease = %candidate, "created lease");
            return Ok(Some(candidate));
        }

        let raw = self.store.get(key).await?;
        if let Some(current) = LeaseExpiry::decode(key, raw.as_deref())? {
            if !current.is_elapsed_at(self.clock.now_millis()) {
                trace!(current = %current, "lease held");
                return Ok(None);
            }
        }

        let candidate = self.candidate();
        let swapped = self.store.get_and_set(key, &candidate.encode()).await?;
        match LeaseExpiry::decode(key, swapped.as_deref())? {
            Some(swapped) if !swapped.is_elapsed_at(self.clock.now_millis()) => {
                // Another process refreshed the lease between our read and swap.
                // Our value stays in the store and extends their lease slightly.
                debug!(swapped = %swapped, "lost takeover race");
                Ok(None)
            }
            swapped => {
                debug!(
                    lease = %candidate,
                    previous = ?swapped.map(|s| s.as_millis()),
                    "took over expired lease"
                );
                Ok(Some(candidate))
            }
        }
    }

    fn candidate(&self) -> LeaseExpiry {
        LeaseExpiry::after(self.clock.now_millis(), self.options.lease_duration())
    }

    fn next_wait(&self) -> Duration {
        let interval = self.options.poll_interval();
        let jitter = self.options.poll_jitter();
        if jitter.is_zero() {
            return interval;
        }
        let jitter_micros = u64::try_from(jitter.as_micros()).unwrap_or(u64::MAX);
        interval + Duration::from_micros(rand::thread_rng().gen_range(0..=jitter_micros))
    }
}

/// Sleeps for `wait`, returning early with [`LockError::Cancelled`] if the
/// flag turns `true`.
async fn wait_or_cancel(wait: Duration, cancel: &mut watch::Receiver<bool>) -> LockResult<()> {
    let sleep = tokio::time::sleep(wait);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return Ok(()),
            changed = cancel.changed() => {
                if changed.is_err() {
                    // Sender gone: nothing can cancel us any more.
                    sleep.as_mut().await;
                    return Ok(());
                }
                if *cancel.borrow_and_update() {
                    return Err(LockError::Cancelled);
                }
            }
        }
    }
}
