//! Batch coordination
//!
//! Drives one full pass over the source dataset: normalize each row, derive
//! its slug, reconcile it against the store, and commit in fixed-size
//! batches. Row-level problems are absorbed into the counts; only
//! run-level failures (unreachable source, commit failure) propagate.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use fairway_common::slug::slugify;

use crate::config::SyncConfig;
use crate::models::MAX_SLUG_LEN;
use crate::normalize::{capped, normalize_row, RowOutcome};
use crate::row::SheetRow;
use crate::source::{SheetSource, SourceError};
use crate::store::{RecordStore, StoreError, UpsertOutcome};

/// Run-level failure. Batches committed before the failure stay committed.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Sync storage failed: {0}")]
    Store(#[from] StoreError),
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Existing records overwritten in place
    pub updated: u64,
    /// Records created for a slug not seen before
    pub new: u64,
    /// Rows excluded by the normalizer (or unreadable CSV records)
    pub skipped: u64,
    /// Rows that failed at the storage layer
    pub errored: u64,
}

impl SyncStats {
    /// Rows that reached the store.
    pub fn written(&self) -> u64 {
        self.updated + self.new
    }

    /// Every row seen during the run.
    pub fn total(&self) -> u64 {
        self.updated + self.new + self.skipped + self.errored
    }
}

impl std::fmt::Display for SyncStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "updated={} new={} skipped={} errored={}",
            self.updated, self.new, self.skipped, self.errored
        )
    }
}

/// Drives sync runs against a [`RecordStore`].
///
/// The store handle is passed in at construction and owned for the
/// pipeline's lifetime; pool lifecycle belongs to the caller.
pub struct SyncPipeline<S: RecordStore> {
    store: S,
    config: SyncConfig,
}

impl<S: RecordStore> SyncPipeline<S> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        Self { store, config }
    }

    /// Incremental sync: upsert every row of the source, never delete.
    pub async fn run(&mut self, source: &SheetSource) -> Result<SyncStats, SyncError> {
        info!(source = %source, "Starting sync run");

        let csv_text = source.fetch(self.config.fetch_timeout()).await?;
        let stats = self.process(&csv_text, source.origin()).await?;

        info!(
            updated = stats.updated,
            new = stats.new,
            skipped = stats.skipped,
            errored = stats.errored,
            "Sync completed"
        );

        Ok(stats)
    }

    /// Full reseed: clear the store, then run the same per-row loop.
    ///
    /// Destructive and explicit — only operator commands call this. The
    /// source is fetched before anything is deleted, so an unreachable
    /// source cannot leave an emptied store behind.
    pub async fn reseed(&mut self, source: &SheetSource) -> Result<SyncStats, SyncError> {
        info!(source = %source, "Starting full reseed");

        let csv_text = source.fetch(self.config.fetch_timeout()).await?;

        let removed = self.store.clear().await?;
        info!(removed, "Cleared location store");

        let stats = self.process(&csv_text, source.origin()).await?;

        info!(
            new = stats.new,
            skipped = stats.skipped,
            errored = stats.errored,
            "Reseed completed"
        );

        Ok(stats)
    }

    async fn process(&mut self, csv_text: &str, origin: &str) -> Result<SyncStats, SyncError> {
        let synced_at = Utc::now();
        let batch_size = self.config.batch_size.max(1) as u64;
        let mut stats = SyncStats::default();
        let mut written_or_errored = 0u64;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        for (index, record) in reader.deserialize::<SheetRow>().enumerate() {
            let row_number = index + 1;

            let row = match record {
                Ok(row) => row,
                Err(err) => {
                    warn!(row = row_number, error = %err, "Skipping unreadable row");
                    stats.skipped += 1;
                    continue;
                }
            };

            let draft = match normalize_row(&row, origin, synced_at) {
                RowOutcome::Accepted(draft) => draft,
                RowOutcome::Skipped(reason) => {
                    debug!(row = row_number, reason = %reason, "Skipping row");
                    stats.skipped += 1;
                    continue;
                }
            };

            let slug = capped(slugify(&draft.business_name), MAX_SLUG_LEN);
            if slug.is_empty() {
                // A name made entirely of stripped characters has no
                // usable natural key.
                debug!(row = row_number, name = %draft.business_name, "Skipping row with empty slug");
                stats.skipped += 1;
                continue;
            }

            match self.store.upsert(&slug, &draft).await {
                Ok(UpsertOutcome::Inserted) => stats.new += 1,
                Ok(UpsertOutcome::Updated) => stats.updated += 1,
                Err(err) => {
                    error!(row = row_number, slug = %slug, error = %err, "Failed to store row");
                    stats.errored += 1;
                }
            }

            written_or_errored += 1;
            if written_or_errored % batch_size == 0 {
                self.store.commit().await?;
                debug!(rows = written_or_errored, "Committed batch");
            }
        }

        // Flush the remainder.
        self.store.commit().await?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationDraft, StateCode};
    use crate::store::{RecordStore, StoreError, UpsertOutcome};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::{BTreeMap, HashSet};
    use std::io::Write;
    use uuid::Uuid;

    #[derive(Debug, Clone)]
    struct StoredRow {
        id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        draft: LocationDraft,
    }

    /// In-memory stand-in for the Postgres store.
    #[derive(Default)]
    struct MemoryStore {
        rows: BTreeMap<String, StoredRow>,
        fail_slugs: HashSet<String>,
        commits: usize,
        cleared: bool,
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn upsert(
            &mut self,
            slug: &str,
            draft: &LocationDraft,
        ) -> Result<UpsertOutcome, StoreError> {
            if self.fail_slugs.contains(slug) {
                return Err(StoreError::Database(sqlx::Error::PoolClosed));
            }
            let now = Utc::now();
            if let Some(existing) = self.rows.get_mut(slug) {
                existing.draft = draft.clone();
                existing.updated_at = now;
                Ok(UpsertOutcome::Updated)
            } else {
                self.rows.insert(
                    slug.to_string(),
                    StoredRow {
                        id: Uuid::new_v4(),
                        created_at: now,
                        updated_at: now,
                        draft: draft.clone(),
                    },
                );
                Ok(UpsertOutcome::Inserted)
            }
        }

        async fn commit(&mut self) -> Result<(), StoreError> {
            self.commits += 1;
            Ok(())
        }

        async fn clear(&mut self) -> Result<u64, StoreError> {
            self.cleared = true;
            let removed = self.rows.len() as u64;
            self.rows.clear();
            Ok(removed)
        }
    }

    const HEADER: &str =
        "name,full_address,state,phone,site,rating,reviews,latitude,longitude,working_hours\n";

    fn pipeline(store: MemoryStore, batch_size: usize) -> SyncPipeline<MemoryStore> {
        SyncPipeline::new(store, SyncConfig::default().with_batch_size(batch_size))
    }

    #[tokio::test]
    async fn test_first_run_inserts_everything() {
        let csv = format!(
            "{HEADER}\
            Par Tee Golf,\"123 Main St, Springfield, OR 97477\",OR,,,4.5,,,,\n\
            Birdie Barn,\"9 Pine Rd, Bend, OR 97701\",OR,,,,,,,\n"
        );

        let mut pipeline = pipeline(MemoryStore::default(), 50);
        let stats = pipeline.process(&csv, "csv_file").await.unwrap();

        assert_eq!(
            stats,
            SyncStats {
                new: 2,
                ..SyncStats::default()
            }
        );
        assert!(pipeline.store.rows.contains_key("par-tee-golf"));
        assert!(pipeline.store.rows.contains_key("birdie-barn"));

        let stored = &pipeline.store.rows["par-tee-golf"];
        assert_eq!(stored.draft.city, "Springfield");
        assert_eq!(stored.draft.zip_code, "97477");
        assert_eq!(stored.draft.state, StateCode::Or);
        assert_eq!(stored.draft.rating, Some(4.5));
    }

    #[tokio::test]
    async fn test_second_run_updates_in_place() {
        let first = format!(
            "{HEADER}Par Tee Golf,\"123 Main St, Springfield, OR 97477\",OR,,,4.5,,,,\n"
        );
        let second = format!(
            "{HEADER}Par Tee Golf,\"123 Main St, Springfield, OR 97477\",OR,,,4.8,,,,\n"
        );

        let mut pipeline = pipeline(MemoryStore::default(), 50);
        pipeline.process(&first, "csv_file").await.unwrap();

        let before = pipeline.store.rows["par-tee-golf"].clone();

        let stats = pipeline.process(&second, "csv_file").await.unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.new, 0);

        let after = &pipeline.store.rows["par-tee-golf"];
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.draft.rating, Some(4.8));
        assert_eq!(pipeline.store.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_of_identical_source_is_idempotent() {
        let csv = format!(
            "{HEADER}\
            Par Tee Golf,\"123 Main St, Springfield, OR 97477\",OR,,,4.5,,,,\n\
            Birdie Barn,\"9 Pine Rd, Bend, OR 97701\",OR,,,,,,,\n"
        );

        let mut pipeline = pipeline(MemoryStore::default(), 50);
        let first = pipeline.process(&csv, "csv_file").await.unwrap();
        assert_eq!(first.new, 2);

        let second = pipeline.process(&csv, "csv_file").await.unwrap();
        assert_eq!(second.new, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(pipeline.store.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_bad_rows_are_counted_not_fatal() {
        let csv = format!(
            "{HEADER}\
            ,\"123 Main St, Springfield, OR 97477\",OR,,,,,,,\n\
            No Comma Golf,A great place to golf,OR,,,,,,,\n\
            Out Of Region,\"1 B St, Reno, NV 89501\",ZZ,,,,,,,\n\
            Par Tee Golf,\"123 Main St, Springfield, OR 97477\",OR,,,,,,,\n"
        );

        let mut pipeline = pipeline(MemoryStore::default(), 50);
        let stats = pipeline.process(&csv, "csv_file").await.unwrap();

        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.new, 1);
        assert_eq!(pipeline.store.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_short_rows_degrade_to_skips() {
        // Fewer fields than headers; the reader is flexible, the missing
        // address fails the required-field check.
        let csv = format!("{HEADER}Lonely Name\n");

        let mut pipeline = pipeline(MemoryStore::default(), 50);
        let stats = pipeline.process(&csv, "csv_file").await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.total(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_isolated_to_one_row() {
        let csv = format!(
            "{HEADER}\
            Par Tee Golf,\"123 Main St, Springfield, OR 97477\",OR,,,,,,,\n\
            Cursed Golf,\"5 Bad Ln, Salem, OR 97301\",OR,,,,,,,\n\
            Birdie Barn,\"9 Pine Rd, Bend, OR 97701\",OR,,,,,,,\n\
            Eagle Nest,\"2 High St, Boise, ID 83702\",ID,,,,,,,\n"
        );

        let mut store = MemoryStore::default();
        store.fail_slugs.insert("cursed-golf".to_string());

        let mut pipeline = pipeline(store, 50);
        let stats = pipeline.process(&csv, "csv_file").await.unwrap();

        assert_eq!(stats.errored, 1);
        assert_eq!(stats.new, 3);
        assert_eq!(pipeline.store.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_commit_cadence_follows_batch_size() {
        let csv = format!(
            "{HEADER}\
            A One,\"1 A St, Bend, OR 97701\",OR,,,,,,,\n\
            B Two,\"2 B St, Bend, OR 97701\",OR,,,,,,,\n\
            C Three,\"3 C St, Bend, OR 97701\",OR,,,,,,,\n\
            D Four,\"4 D St, Bend, OR 97701\",OR,,,,,,,\n\
            E Five,\"5 E St, Bend, OR 97701\",OR,,,,,,,\n"
        );

        let mut pipeline = pipeline(MemoryStore::default(), 2);
        let stats = pipeline.process(&csv, "csv_file").await.unwrap();

        assert_eq!(stats.new, 5);
        // Two full batches plus the final flush.
        assert_eq!(pipeline.store.commits, 3);
    }

    #[tokio::test]
    async fn test_reseed_clears_then_inserts() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            "{HEADER}Par Tee Golf,\"123 Main St, Springfield, OR 97477\",OR,,,,,,,\n"
        )
        .unwrap();
        let source = SheetSource::File(tmp.path().to_path_buf());

        let mut store = MemoryStore::default();
        // Pre-existing record that the reseed must remove.
        store
            .upsert(
                "stale-location",
                &sample_draft("Stale Location"),
            )
            .await
            .unwrap();

        let mut pipeline = pipeline(store, 50);
        let stats = pipeline.reseed(&source).await.unwrap();

        assert!(pipeline.store.cleared);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.updated, 0);
        assert!(!pipeline.store.rows.contains_key("stale-location"));
        assert!(pipeline.store.rows.contains_key("par-tee-golf"));
    }

    #[tokio::test]
    async fn test_unreachable_source_fails_run() {
        let source = SheetSource::File("/nonexistent/locations.csv".into());
        let mut pipeline = pipeline(MemoryStore::default(), 50);

        let err = pipeline.run(&source).await.unwrap_err();
        assert!(matches!(err, SyncError::Source(_)));
        assert!(pipeline.store.rows.is_empty());
    }

    #[test]
    fn test_stats_display() {
        let stats = SyncStats {
            updated: 2,
            new: 1,
            skipped: 3,
            errored: 0,
        };
        assert_eq!(stats.to_string(), "updated=2 new=1 skipped=3 errored=0");
        assert_eq!(stats.written(), 3);
        assert_eq!(stats.total(), 6);
    }

    fn sample_draft(name: &str) -> LocationDraft {
        use crate::normalize::{normalize_row, RowOutcome};
        use crate::row::SheetRow;

        let row = SheetRow {
            name: Some(name.to_string()),
            full_address: Some("1 A St, Bend, OR 97701".to_string()),
            state: Some("OR".to_string()),
            ..SheetRow::default()
        };
        match normalize_row(&row, "csv_file", Utc::now()) {
            RowOutcome::Accepted(draft) => draft,
            RowOutcome::Skipped(reason) => panic!("sample draft skipped: {reason}"),
        }
    }
}
