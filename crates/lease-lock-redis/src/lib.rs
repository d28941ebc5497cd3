//! Redis backend for lease locks.

pub mod builder;
pub mod store;

pub use builder::{connect, RedisLockCoordinator, RedisLockCoordinatorBuilder};
pub use store::RedisLeaseStore;
