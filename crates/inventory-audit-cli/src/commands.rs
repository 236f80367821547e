use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inventory-audit")]
#[command(about = "Inventory a directory tree and audit it for debris and duplicates", long_about = None)]
pub struct Cli {
    /// Inventory database, overriding the configured path
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Crawl a directory tree into the inventory
    Scan {
        /// Root directory to audit
        root: PathBuf,
        /// Write the CSV inventory once the crawl finishes
        #[arg(long)]
        export: bool,
    },
    /// Export the full inventory as CSV
    Report,
    /// Print trash, duplicate and reclaimable-space totals
    Summary,
    /// Print configuration values
    PrintConfig,
}
