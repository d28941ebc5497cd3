//! Lease-based distributed mutex over a shared key-value store.
//!
//! Processes that share nothing but a store (Redis) serialize access to a
//! resource named by a string key. The holder of a lock is whoever last wrote
//! a live expiry timestamp under that key.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lease_lock::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = RedisLockCoordinatorBuilder::new()
//!         .host("127.0.0.1")
//!         .port(6379)
//!         .lease_duration(Duration::from_secs(30))
//!         .build()
//!         .await?;
//!
//!     // Blocks until the lock is free
//!     let lease = coordinator.acquire("nightly-report").await?;
//!
//!     // Critical section; must finish well within the lease duration
//!     println!("Doing critical work...");
//!
//!     coordinator.release("nightly-report", lease).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Operations
//!
//! - `try_acquire(key)`: one attempt, `Ok(None)` if a live lease is held
//! - `acquire(key)`: polls until acquired, no deadline
//! - `acquire_with_cancel` / `acquire_timeout`: opt-in cancellation and deadline
//! - `release(key, lease)`: deletes the key unless the caller's lease has lapsed
//!
//! Leases are never extended. A holder whose work outlives its lease loses the
//! lock silently, and the protocol's takeover and release checks are weaker
//! than a true compare-and-swap; see [`LeaseLockCoordinator`].
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `lease-lock-core`: protocol, options, errors, in-memory store
//! - `lease-lock-redis`: Redis store and coordinator builder

// Re-export core types
pub use lease_lock_core::*;

// Re-export redis backend
#[allow(ambiguous_glob_reexports)]
pub use lease_lock_redis::*;
