//! # SQLite database methods
//!
//! "Low-level" query functions. Each one takes a `&mut SqliteConnection`, so callers can run them
//! against a pooled connection or compose several into a transaction by passing `&mut *tx`.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod batches;
pub mod orders;

const SQLITE_DB_URL: &str = "sqlite://data/wishlist_store.db";

pub fn db_url() -> String {
    let result = env::var("WPG_DATABASE_URL").unwrap_or_else(|_| {
        info!("WPG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
