//! Database connection for CLI commands

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect to the location store and bring the schema up to date.
pub async fn connect(database_url: Option<&str>) -> Result<PgPool> {
    let url = match database_url {
        Some(url) => url.to_string(),
        None => std::env::var("DATABASE_URL")
            .context("DATABASE_URL is not set (flag --database-url or .env)")?,
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}
