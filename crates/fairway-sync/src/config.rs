//! Sync configuration

use std::time::Duration;

use fairway_common::{FairwayError, Result};

use crate::source::SheetSource;

// ============================================================================
// Sync Configuration Constants
// ============================================================================

/// Default number of written records per commit batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default timeout for fetching the sheet export, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Sync pipeline configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Published CSV export URL (`FAIRWAY_SHEET_URL`); required for the
    /// recurring sync, not for file-based operator imports.
    pub sheet_url: Option<String>,
    /// Records written between commits (`FAIRWAY_SYNC_BATCH_SIZE`)
    pub batch_size: usize,
    /// HTTP fetch timeout in seconds (`FAIRWAY_FETCH_TIMEOUT`)
    pub fetch_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sheet_url: None,
            batch_size: DEFAULT_BATCH_SIZE,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            sheet_url: std::env::var("FAIRWAY_SHEET_URL").ok().filter(|s| !s.is_empty()),
            batch_size: std::env::var("FAIRWAY_SYNC_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
            fetch_timeout_secs: std::env::var("FAIRWAY_FETCH_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(FairwayError::Config(
                "Sync batch size must be greater than 0".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(FairwayError::Config(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured recurring-sync source.
    pub fn source(&self) -> Result<SheetSource> {
        self.sheet_url
            .clone()
            .map(SheetSource::Url)
            .ok_or_else(|| {
                FairwayError::Config("FAIRWAY_SHEET_URL is not configured".to_string())
            })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Override the batch size (tests, operator flags).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert!(config.sheet_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_is_invalid() {
        let config = SyncConfig::default().with_batch_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_requires_url() {
        let config = SyncConfig::default();
        assert!(config.source().is_err());

        let config = SyncConfig {
            sheet_url: Some("https://example.com/export.csv".to_string()),
            ..SyncConfig::default()
        };
        assert!(matches!(config.source(), Ok(SheetSource::Url(_))));
    }
}
