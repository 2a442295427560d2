//! Upsert reconciliation against the location store
//!
//! Matching is by slug, the natural key: an existing row is fully replaced
//! (same `id`, same `created_at`, fresh `updated_at`), a new slug gets a
//! fresh row. Each upsert runs inside a savepoint on the current batch
//! transaction so a single bad record rolls back alone and the batch keeps
//! going.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::LocationDraft;

/// Storage-layer failure for one record or one commit.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// The store handle the batch coordinator writes through.
///
/// Passed in explicitly at call time; lifecycle (pool creation, shutdown)
/// belongs to the surrounding process.
#[async_trait]
pub trait RecordStore: Send {
    /// Insert-or-update the record identified by `slug`.
    async fn upsert(&mut self, slug: &str, draft: &LocationDraft)
        -> Result<UpsertOutcome, StoreError>;

    /// Commit everything written since the last commit.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Delete every stored record. Reseed only — never part of a normal
    /// sync.
    async fn clear(&mut self) -> Result<u64, StoreError>;
}

/// PostgreSQL-backed record store.
///
/// A transaction is opened lazily for each batch; `commit` closes it. An
/// uncommitted transaction rolls back on drop, so a run that dies mid-batch
/// leaves only fully committed batches behind.
pub struct PgRecordStore {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    async fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, StoreError> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        match self.tx.as_mut() {
            Some(tx) => Ok(tx),
            None => unreachable!("transaction was just opened"),
        }
    }

    async fn upsert_in_tx(
        tx: &mut Transaction<'static, Postgres>,
        slug: &str,
        draft: &LocationDraft,
    ) -> Result<UpsertOutcome, StoreError> {
        let hours = draft
            .hours
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let metadata = serde_json::to_value(&draft.metadata)?;
        let now = Utc::now();

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM locations WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&mut **tx)
                .await?;

        if let Some(id) = existing {
            // Full replace; id and created_at stay put.
            sqlx::query(
                r#"
                UPDATE locations SET
                    business_name = $1,
                    address = $2,
                    city = $3,
                    state = $4,
                    zip_code = $5,
                    phone = $6,
                    website = $7,
                    description = $8,
                    hours = $9,
                    membership_info = $10,
                    rating = $11,
                    reviews_count = $12,
                    reviews_link = $13,
                    latitude = $14,
                    longitude = $15,
                    metadata = $16,
                    updated_at = $17
                WHERE id = $18
                "#,
            )
            .bind(&draft.business_name)
            .bind(&draft.address)
            .bind(&draft.city)
            .bind(draft.state)
            .bind(&draft.zip_code)
            .bind(&draft.phone)
            .bind(&draft.website)
            .bind(&draft.description)
            .bind(&hours)
            .bind(&draft.membership_info)
            .bind(draft.rating)
            .bind(draft.reviews_count)
            .bind(&draft.reviews_link)
            .bind(draft.latitude)
            .bind(draft.longitude)
            .bind(&metadata)
            .bind(now)
            .bind(id)
            .execute(&mut **tx)
            .await?;

            debug!(slug = %slug, "Updated location");
            Ok(UpsertOutcome::Updated)
        } else {
            sqlx::query(
                r#"
                INSERT INTO locations (
                    id, business_name, address, city, state, zip_code,
                    phone, website, description, hours, membership_info,
                    slug, rating, reviews_count, reviews_link,
                    latitude, longitude, metadata, created_at, updated_at
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6,
                    $7, $8, $9, $10, $11,
                    $12, $13, $14, $15,
                    $16, $17, $18, $19, $19
                )
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&draft.business_name)
            .bind(&draft.address)
            .bind(&draft.city)
            .bind(draft.state)
            .bind(&draft.zip_code)
            .bind(&draft.phone)
            .bind(&draft.website)
            .bind(&draft.description)
            .bind(&hours)
            .bind(&draft.membership_info)
            .bind(slug)
            .bind(draft.rating)
            .bind(draft.reviews_count)
            .bind(&draft.reviews_link)
            .bind(draft.latitude)
            .bind(draft.longitude)
            .bind(&metadata)
            .bind(now)
            .execute(&mut **tx)
            .await?;

            debug!(slug = %slug, "Inserted location");
            Ok(UpsertOutcome::Inserted)
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn upsert(
        &mut self,
        slug: &str,
        draft: &LocationDraft,
    ) -> Result<UpsertOutcome, StoreError> {
        let tx = self.tx().await?;

        // Savepoint per record: one failed row rolls back alone and the
        // rest of the batch proceeds.
        sqlx::query("SAVEPOINT upsert_row").execute(&mut **tx).await?;

        match Self::upsert_in_tx(tx, slug, draft).await {
            Ok(outcome) => {
                sqlx::query("RELEASE SAVEPOINT upsert_row")
                    .execute(&mut **tx)
                    .await?;
                Ok(outcome)
            }
            Err(err) => {
                sqlx::query("ROLLBACK TO SAVEPOINT upsert_row")
                    .execute(&mut **tx)
                    .await?;
                Err(err)
            }
        }
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn clear(&mut self) -> Result<u64, StoreError> {
        let tx = self.tx().await?;
        let result = sqlx::query("DELETE FROM locations")
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
