//! Sync command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::pipeline;
use crate::state::SyncState;

/// Run the sync command
pub async fn run(feed_name: Option<&str>, dry_run: bool, config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let feeds = config.select_feeds(feed_name)?;
    if feeds.is_empty() {
        warn!("No feeds enabled. Check your configuration.");
        return Ok(());
    }

    info!("Syncing {} feed(s)...", feeds.len());

    let state_path = config.state_path();
    let mut state = SyncState::load(&state_path).unwrap_or_default();

    for feed in feeds {
        let outcome = pipeline::run(feed, &config.data_dir, dry_run).await?;

        if outcome.written {
            state.record(&outcome.feed, outcome.stats);
        }

        println!(
            "[OK] {}: existing {} | fetched {} | total {}",
            outcome.feed, outcome.stats.existing, outcome.stats.fetched, outcome.stats.total
        );
    }

    if !dry_run {
        state.save(&state_path)?;
    }

    Ok(())
}
