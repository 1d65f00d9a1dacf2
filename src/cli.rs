//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "iocsync")]
#[command(author, version, about = "IOC feed collector - merges IPv4 threat indicators into local stores")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "iocsync.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch enabled feeds and merge them into their stores
    Sync {
        /// Sync a single feed by name (selects it even if disabled)
        #[arg(long)]
        feed: Option<String>,

        /// Fetch and merge but do not write the stores
        #[arg(long)]
        dry_run: bool,
    },

    /// Show per-feed store statistics
    Status,

    /// Check whether an IP is present in any configured store
    Check {
        /// IP address to look up
        ip: String,
    },

    /// Show version
    Version,
}
