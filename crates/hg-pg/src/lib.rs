//! PostgreSQL integration.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from `DB_URL`
//! - [`migrate()`] — Creates tables and indices for a set of schemas
//!
//! ## Schema
//!
//! - [`Schema`] — Table metadata and DDL generation
//!
//! ## Table Names
//!
//! Constants for all persistent entities: games, seats, rebuys, results.
mod schema;

pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Connects to PostgreSQL using the `DB_URL` environment variable.
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
///
/// # Panics
///
/// Panics if `DB_URL` is not set or if connection fails.
pub async fn db() -> Arc<Client> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").expect("DB_URL must be set");
    let (client, connection) = tokio_postgres::connect(url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await
        .expect("set client_min_messages");
    Arc::new(client)
}

/// Runs each DDL batch in order. Statements are idempotent.
pub async fn migrate(client: &Client, batches: &[&'static str]) -> Result<(), PgErr> {
    for batch in batches {
        client.batch_execute(batch).await?;
    }
    log::info!("schema ready ({} batches)", batches.len());
    Ok(())
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Table for game headers, settings, and lifecycle columns.
#[rustfmt::skip]
pub const GAMES:   &str = "games";
/// Table for the roster of each game.
#[rustfmt::skip]
pub const SEATS:   &str = "seats";
/// Table for the append-only rebuy history.
#[rustfmt::skip]
pub const REBUYS:  &str = "rebuys";
/// Table for confirmed settlement rows.
#[rustfmt::skip]
pub const RESULTS: &str = "results";
