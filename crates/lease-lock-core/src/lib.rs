//! Core protocol and types for lease-based distributed locks.

pub mod clock;
pub mod coordinator;
pub mod error;
pub mod lease;
pub mod memory;
pub mod options;
pub mod prelude;
pub mod store;

pub use error::{LockError, LockResult};
pub use prelude::*;
