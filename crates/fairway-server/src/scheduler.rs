//! Recurring sync runs
//!
//! A background task triggers the sync pipeline on a fixed interval
//! (default hourly). The same [`SyncService`] also backs the on-demand
//! trigger endpoint; a `try_lock` guard guarantees at-most-one run at a
//! time against the store — a tick or request arriving mid-run is skipped,
//! never interleaved, because concurrent runs could race on
//! insert-vs-update decisions for the same slug.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use fairway_common::FairwayError;
use fairway_sync::{PgRecordStore, SyncConfig, SyncError, SyncPipeline, SyncStats};

use crate::config::SchedulerConfig;

/// Why a triggered run did not produce stats.
#[derive(Error, Debug)]
pub enum SyncRunError {
    #[error("A sync run is already in progress")]
    AlreadyRunning,

    #[error("Sync is not configured: {0}")]
    Config(#[from] FairwayError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Shared entry point for triggered sync runs.
pub struct SyncService {
    db: PgPool,
    config: SyncConfig,
    guard: tokio::sync::Mutex<()>,
}

impl SyncService {
    pub fn new(db: PgPool, config: SyncConfig) -> Arc<Self> {
        Arc::new(Self {
            db,
            config,
            guard: tokio::sync::Mutex::new(()),
        })
    }

    /// Run one sync pass unless a run is already in flight.
    pub async fn try_run(&self) -> Result<SyncStats, SyncRunError> {
        let Ok(_running) = self.guard.try_lock() else {
            return Err(SyncRunError::AlreadyRunning);
        };

        let source = self.config.source()?;
        let store = PgRecordStore::new(self.db.clone());
        let mut pipeline = SyncPipeline::new(store, self.config.clone());

        Ok(pipeline.run(&source).await?)
    }
}

/// Background scheduler driving [`SyncService`] on an interval.
pub struct SyncScheduler {
    service: Arc<SyncService>,
    interval: Duration,
    initial_delay: Duration,
}

impl SyncScheduler {
    pub fn new(service: Arc<SyncService>, config: &SchedulerConfig) -> Self {
        Self {
            service,
            interval: Duration::from_secs(config.interval_secs),
            initial_delay: Duration::from_secs(config.initial_delay_secs),
        }
    }

    /// Start the scheduler in the background.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "Sync scheduler started"
            );

            // Let the server finish starting up before the first run.
            sleep(self.initial_delay).await;

            loop {
                match self.service.try_run().await {
                    Ok(stats) => info!(%stats, "Scheduled sync completed"),
                    Err(SyncRunError::AlreadyRunning) => {
                        warn!("Previous sync still running, skipping this tick")
                    }
                    Err(err) => error!(error = %err, "Scheduled sync failed"),
                }

                sleep(self.interval).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgresql://localhost/fairway_test").unwrap()
    }

    #[tokio::test]
    async fn test_unconfigured_source_is_a_config_error() {
        // No FAIRWAY_SHEET_URL: the run fails before touching the pool.
        let service = SyncService::new(lazy_pool(), SyncConfig::default());
        let err = service.try_run().await.unwrap_err();
        assert!(matches!(err, SyncRunError::Config(_)));
    }

    #[tokio::test]
    async fn test_concurrent_run_is_skipped() {
        let service = SyncService::new(lazy_pool(), SyncConfig::default());

        let _in_flight = service.guard.try_lock().unwrap();

        let err = service.try_run().await.unwrap_err();
        assert!(matches!(err, SyncRunError::AlreadyRunning));
    }
}
