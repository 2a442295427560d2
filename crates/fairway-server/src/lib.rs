//! Fairway Server Library
//!
//! HTTP server for the golf-simulator location directory.
//!
//! # Overview
//!
//! The server exposes a small read-side JSON API over the location store
//! and keeps that store fresh:
//!
//! - **API Endpoints**: browse, lookup-by-slug, search, and city listings
//! - **Sync Scheduler**: recurring import from the published spreadsheet
//!   export, with an at-most-one-run guard shared with the on-demand
//!   trigger endpoint
//! - **Database Management**: PostgreSQL integration with SQLx, migrations
//!   run at startup
//! - **Configuration**: environment-based configuration management
//!
//! # Example
//!
//! ```no_run
//! use fairway_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     // pool setup, migrations, api::router(...), axum::serve(...)
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod scheduler;

// Re-export commonly used types
pub use error::{AppError, AppResult};
pub use scheduler::{SyncRunError, SyncScheduler, SyncService};
