//! Read-side queries over the location store
//!
//! Simple lookups consumed by the API handlers and the CLI. These impose
//! no invariants of their own; they only read what the sync pipeline
//! wrote.

use serde::Serialize;
use sqlx::PgPool;

use crate::models::{Location, StateCode};
use fairway_common::slug::city_slug;

/// One (city, state) group on the city listing.
#[derive(Debug, Clone, Serialize)]
pub struct CityListing {
    pub city: String,
    pub state: StateCode,
    pub count: i64,
    /// Derived grouping key, never persisted
    pub slug: String,
}

#[derive(sqlx::FromRow)]
struct CityCountRow {
    city: String,
    state: StateCode,
    count: i64,
}

/// Every location, ordered by business name.
pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Location>, sqlx::Error> {
    sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY business_name")
        .fetch_all(pool)
        .await
}

/// Exact-match lookup by slug.
pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Location>, sqlx::Error> {
    sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive substring search on business name or city.
pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<Location>, sqlx::Error> {
    let pattern = format!("%{}%", query);
    sqlx::query_as::<_, Location>(
        "SELECT * FROM locations \
         WHERE business_name ILIKE $1 OR city ILIKE $1 \
         ORDER BY business_name",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// Distinct cities with their location counts and derived slugs.
pub async fn cities_with_counts(pool: &PgPool) -> Result<Vec<CityListing>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CityCountRow>(
        "SELECT city, state, COUNT(*) AS count FROM locations \
         GROUP BY city, state \
         ORDER BY count DESC, city",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let slug = city_slug(&row.city, row.state.as_str());
            CityListing {
                city: row.city,
                state: row.state,
                count: row.count,
                slug,
            }
        })
        .collect())
}

/// Total number of stored locations.
pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM locations")
        .fetch_one(pool)
        .await
}
