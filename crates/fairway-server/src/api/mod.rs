//! HTTP API
//!
//! Read-side endpoints over the location store plus the on-demand sync
//! trigger. The handlers are thin: they call into
//! [`fairway_sync::queries`] and translate failures via [`AppError`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

use fairway_sync::queries;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware;
use crate::scheduler::{SyncRunError, SyncService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub sync: Arc<SyncService>,
}

/// Build the application router with all routes and middleware
pub fn router(state: AppState, config: &Config) -> Router {
    let api_routes = Router::new()
        .route("/locations", get(list_locations))
        .route("/locations/:slug", get(get_location))
        .route("/search", get(search_locations))
        .route("/cities", get(list_cities))
        .route("/sync", post(trigger_sync));

    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .nest("/api/v1", api_routes)
        .with_state(state)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Every location, ordered by business name
async fn list_locations(State(state): State<AppState>) -> AppResult<Response> {
    let locations = queries::fetch_all(&state.db).await?;
    Ok(Json(json!({
        "count": locations.len(),
        "locations": locations,
    }))
    .into_response())
}

/// One location by its slug
async fn get_location(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let location = queries::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", slug)))?;
    Ok(Json(location).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Substring search on business name or city
async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Response> {
    let locations = queries::search(&state.db, &params.q).await?;
    Ok(Json(json!({
        "query": params.q,
        "count": locations.len(),
        "locations": locations,
    }))
    .into_response())
}

/// Cities with location counts and derived slugs
async fn list_cities(State(state): State<AppState>) -> AppResult<Response> {
    let cities = queries::cities_with_counts(&state.db).await?;
    Ok(Json(json!({ "cities": cities })).into_response())
}

/// Directory statistics
async fn get_stats(State(state): State<AppState>) -> AppResult<Response> {
    let locations = queries::count(&state.db).await?;
    let cities = queries::cities_with_counts(&state.db).await?;
    Ok(Json(json!({
        "locations": locations,
        "cities": cities.len(),
    }))
    .into_response())
}

/// Trigger a sync run right now
async fn trigger_sync(State(state): State<AppState>) -> AppResult<Response> {
    let stats = state.sync.try_run().await.map_err(|err| match err {
        SyncRunError::AlreadyRunning => AppError::Conflict(err.to_string()),
        SyncRunError::Config(e) => AppError::Config(e.to_string()),
        SyncRunError::Sync(e) => AppError::Internal(e.to_string()),
    })?;

    Ok(Json(json!({
        "status": "completed",
        "stats": stats,
    }))
    .into_response())
}
