//! `fairway seed` - destructive reseed from a local CSV file

use std::io::{self, Write};
use std::path::PathBuf;

use fairway_sync::{PgRecordStore, SheetSource, SyncConfig, SyncPipeline};

use crate::db;
use crate::Result;

pub async fn run(database_url: Option<&str>, file: PathBuf, yes: bool) -> Result<()> {
    if !yes && !confirm()? {
        println!("Aborted.");
        return Ok(());
    }

    let pool = db::connect(database_url).await?;
    let config = SyncConfig::from_env()?;

    let mut pipeline = SyncPipeline::new(PgRecordStore::new(pool), config);
    let stats = pipeline.reseed(&SheetSource::File(file)).await?;

    println!("Reseed completed: {stats}");
    Ok(())
}

fn confirm() -> Result<bool> {
    print!("This deletes every stored location before importing. Continue? [y/N] ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
