//! iocsync - IOC Feed Collector
//!
//! Collects IPv4 threat indicators from external feeds into local stores.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use iocsync::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Sync { feed, dry_run } => {
            iocsync::commands::sync::run(feed.as_deref(), dry_run, &cli.config).await
        }
        Commands::Status => iocsync::commands::status::run(&cli.config),
        Commands::Check { ip } => iocsync::commands::check::run(&ip, &cli.config),
        Commands::Version => {
            println!("iocsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
