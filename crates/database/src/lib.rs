//! Tutorline Database Crate
//!
//! Connection preparation and schema migrations for the SQLite store that
//! backs identities, conversations, membership and the message log.

use anyhow::Result;
use sqlx::SqlitePool;
use tutorline_config::DatabaseConfig;

pub mod connection;
pub mod migrations;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

/// Connect and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = prepare_database(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
