//! Sync sources
//!
//! Where the CSV text comes from: the published spreadsheet export (HTTP)
//! or a local file (operator seeding). A fetch failure is a run-level
//! error — the whole run fails cleanly, nothing partial is committed past
//! the last batch boundary.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors raised while acquiring the source dataset.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to fetch sheet export: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A location dataset to sync from.
#[derive(Debug, Clone)]
pub enum SheetSource {
    /// Published CSV export URL (the recurring sync path)
    Url(String),
    /// Local CSV file (operator imports and reseeds)
    File(PathBuf),
}

impl SheetSource {
    /// Provenance label recorded in each synced record's metadata.
    pub fn origin(&self) -> &'static str {
        match self {
            SheetSource::Url(_) => "google_sheet",
            SheetSource::File(_) => "csv_file",
        }
    }

    /// Fetch the whole dataset as CSV text.
    ///
    /// `timeout` bounds the HTTP fetch; a timeout fails the run rather
    /// than stalling it.
    pub async fn fetch(&self, timeout: Duration) -> Result<String, SourceError> {
        match self {
            SheetSource::Url(url) => {
                info!(url = %url, "Fetching sheet export");
                let client = reqwest::Client::builder().timeout(timeout).build()?;
                let body = client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                info!(bytes = body.len(), "Fetched sheet export");
                Ok(body)
            }
            SheetSource::File(path) => {
                info!(path = %path.display(), "Reading local dataset");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::File {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

impl std::fmt::Display for SheetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSource::Url(url) => write!(f, "{}", url),
            SheetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_origin_labels() {
        assert_eq!(SheetSource::Url("https://x".into()).origin(), "google_sheet");
        assert_eq!(SheetSource::File("x.csv".into()).origin(), "csv_file");
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "name,full_address").unwrap();
        writeln!(tmp, "Par Tee Golf,\"1 A St, Bend, OR 97701\"").unwrap();

        let source = SheetSource::File(tmp.path().to_path_buf());
        let text = source.fetch(Duration::from_secs(5)).await.unwrap();
        assert!(text.starts_with("name,full_address"));
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_fatal() {
        let source = SheetSource::File("/nonexistent/locations.csv".into());
        let err = source.fetch(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, SourceError::File { .. }));
    }
}
