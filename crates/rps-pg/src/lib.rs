//! PostgreSQL integration.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from `DB_URL`
//! - [`migrate()`] — Applies a [`Schema`]'s DDL
//!
//! ## Table Names
//!
//! Constants for all persistent entities.
mod schema;

pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Connects to PostgreSQL using the given URL (normally `DB_URL`).
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
/// The connection driver is spawned onto the current runtime and
/// logs if it ever terminates.
pub async fn db(url: &str) -> Result<Arc<Client>, PgErr> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// Creates the table and its indices if they are missing.
pub async fn migrate<S>(client: &Client) -> Result<(), PgErr>
where
    S: Schema,
{
    log::info!("migrating table ({})", S::name());
    client.batch_execute(S::creates()).await?;
    client.batch_execute(S::indices()).await
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Single keyed table holding game and player records.
#[rustfmt::skip]
pub const RECORDS: &str = "records";
