//! Durable game state.
//!
//! Every event handler is stateless: it loads a [`Game`](rps_gameplay::Game),
//! mutates it, and writes back through a [`Store`]. Writes that race with
//! another handler are conditional and fail as [`StoreError::Stale`]
//! instead of overwriting; the caller reloads and tries again.
//!
//! ## Layout
//!
//! - [`Key`] — `(game, kind)` composite key into a single namespace
//! - [`Kind`] — `GAME` or `PLAYER#<name>`
//! - [`Record`] — The row stored under a key
//!
//! ## Backends
//!
//! - [`Memory`] — In-process map, used in tests and when no database is set
//! - `Arc<tokio_postgres::Client>` — The `records` table (feature `database`)
mod error;
mod key;
mod memory;
mod record;
mod store;

#[cfg(feature = "database")]
mod postgres;

pub use error::*;
pub use key::*;
pub use memory::*;
pub use record::*;
pub use store::*;

/// Runs a store call under [`STORE_TIMEOUT`](rps_core::STORE_TIMEOUT).
/// Elapsing is reported as [`StoreError::Timeout`].
pub async fn bounded<T, F>(call: F) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(rps_core::STORE_TIMEOUT, call)
        .await
        .unwrap_or(Err(StoreError::Timeout))
}
