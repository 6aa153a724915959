//! Database connection pool management and schema setup.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::Config;

const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    Ok(pool)
}

/// Apply the schema. Every statement is IF NOT EXISTS, so this is safe
/// to run on every boot.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    // raw_sql rather than query() because the migration file contains
    // multiple statements and prepared statements only allow one.
    sqlx::raw_sql(INIT_SQL)
        .execute(pool)
        .await
        .context("failed to apply schema")?;

    info!("schema up to date");
    Ok(())
}

/// Check if the database connection is healthy.
pub async fn check_health(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .is_ok()
}
