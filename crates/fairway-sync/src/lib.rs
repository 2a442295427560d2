//! Fairway Sync Library
//!
//! Keeps the location store in sync with an external spreadsheet export.
//!
//! # Architecture
//!
//! - **row**: explicit optional-field schema for one raw CSV row
//! - **normalize**: raw row -> canonical [`models::LocationDraft`] or a
//!   skip decision with a reason
//! - **store**: slug-keyed upsert reconciliation with per-record failure
//!   isolation ([`store::RecordStore`] / [`store::PgRecordStore`])
//! - **coordinator**: drives a full pass over the dataset, commits in
//!   fixed-size batches, and aggregates counts
//! - **source**: where the CSV text comes from (published sheet URL or a
//!   local file)
//! - **queries**: read-side lookups consumed by the API and the CLI
//!
//! # Example
//!
//! ```no_run
//! use fairway_sync::{PgRecordStore, SheetSource, SyncConfig, SyncPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = sqlx::PgPool::connect("postgresql://localhost/fairway").await?;
//!     let config = SyncConfig::from_env()?;
//!     let source = SheetSource::Url("https://example.com/locations.csv".into());
//!
//!     let mut pipeline = SyncPipeline::new(PgRecordStore::new(pool), config);
//!     let stats = pipeline.run(&source).await?;
//!     println!("{stats}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod models;
pub mod normalize;
pub mod queries;
pub mod row;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use config::SyncConfig;
pub use coordinator::{SyncError, SyncPipeline, SyncStats};
pub use models::{Hours, Location, LocationDraft, StateCode};
pub use normalize::{normalize_row, RowOutcome, SkipReason};
pub use source::SheetSource;
pub use store::{PgRecordStore, RecordStore, StoreError, UpsertOutcome};
