//! Example: Using Redis lease locks
//!
//! Run with: `cargo run --example redis_lock`
//!
//! Requires a Redis server. Set REDIS_URL (or REDIS_HOST / REDIS_PORT) and
//! optionally LOCK_LEASE_MS / LOCK_POLL_MS, or rely on the defaults below.

use std::time::Duration;

use lease_lock::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lease_lock=debug")),
        )
        .init();

    if std::env::var("LOCK_LEASE_MS").is_err() {
        std::env::set_var("LOCK_LEASE_MS", "5000");
    }

    println!("Connecting to Redis...");
    let coordinator = RedisLockCoordinatorBuilder::from_env()?.build().await?;
    println!(
        "Lease {:?}, polling every {:?}",
        coordinator.options().lease_duration(),
        coordinator.options().poll_interval()
    );

    // Acquire the lock, waiting up to 10 seconds
    println!("Acquiring lock...");
    let lease = coordinator
        .acquire_timeout("example-resource", Duration::from_secs(10))
        .await?;
    println!("Lock acquired, lease expires at {} ms", lease);

    // Leases are never extended: keep the work well inside the lease
    println!("Doing work...");
    tokio::time::sleep(Duration::from_secs(1)).await;
    println!("Work completed");

    // A second attempt while the lease is live is refused
    match coordinator.try_acquire("example-resource").await? {
        Some(_) => println!("Unexpectedly acquired the lock twice"),
        None => println!("Lock is held, as expected"),
    }

    coordinator.release("example-resource", lease).await?;
    println!("Lock released");

    Ok(())
}
