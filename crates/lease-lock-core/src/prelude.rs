//! Convenience prelude for lease lock types.

pub use crate::clock::{Clock, SystemClock};
pub use crate::coordinator::LeaseLockCoordinator;
pub use crate::error::{LockError, LockResult};
pub use crate::lease::LeaseExpiry;
pub use crate::memory::MemoryLeaseStore;
pub use crate::options::{LockOptions, LockOptionsBuilder};
pub use crate::store::LeaseStore;
