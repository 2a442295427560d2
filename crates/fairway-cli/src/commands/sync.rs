//! `fairway sync` - incremental sync run

use std::path::PathBuf;

use fairway_sync::{PgRecordStore, SheetSource, SyncConfig, SyncPipeline};

use crate::db;
use crate::Result;

pub async fn run(
    database_url: Option<&str>,
    url: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let pool = db::connect(database_url).await?;
    let config = SyncConfig::from_env()?;

    let source = match (file, url) {
        (Some(path), _) => SheetSource::File(path),
        (None, Some(url)) => SheetSource::Url(url),
        (None, None) => config.source()?,
    };

    let mut pipeline = SyncPipeline::new(PgRecordStore::new(pool), config);
    let stats = pipeline.run(&source).await?;

    println!("Sync completed: {stats}");
    Ok(())
}
