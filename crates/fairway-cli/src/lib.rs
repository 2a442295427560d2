//! Fairway CLI Library
//!
//! Operator tooling for the location directory: incremental syncs,
//! destructive reseeds, and quick store inspection.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod db;

/// Result type alias for CLI operations
pub type Result<T> = anyhow::Result<T>;

#[derive(Parser, Debug)]
#[command(name = "fairway")]
#[command(author, version, about = "Fairway location directory CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database connection string
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an incremental sync against the configured sheet export
    Sync {
        /// Override the sheet export URL
        #[arg(long)]
        url: Option<String>,

        /// Sync from a local CSV file instead of the sheet
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
    },

    /// Clear the store and reseed it from a local CSV file (destructive)
    Seed {
        /// CSV file to seed from
        #[arg(long)]
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List stored locations
    List,

    /// Show one location as JSON
    Show {
        /// Location slug
        slug: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_with_file() {
        let cli = Cli::try_parse_from(["fairway", "sync", "--file", "data/locations.csv"]).unwrap();
        match cli.command {
            Commands::Sync { file: Some(path), url: None } => {
                assert_eq!(path, PathBuf::from("data/locations.csv"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_sync_url_and_file_conflict() {
        let result = Cli::try_parse_from([
            "fairway", "sync", "--url", "https://x", "--file", "x.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_seed_requires_file() {
        assert!(Cli::try_parse_from(["fairway", "seed"]).is_err());

        let cli = Cli::try_parse_from(["fairway", "seed", "--file", "x.csv", "--yes"]).unwrap();
        match cli.command {
            Commands::Seed { yes: true, .. } => {}
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["fairway", "show", "par-tee-golf"]).unwrap();
        match cli.command {
            Commands::Show { slug } => assert_eq!(slug, "par-tee-golf"),
            other => panic!("unexpected parse: {other:?}"),
        }
    }
}
