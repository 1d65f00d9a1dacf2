//! The ingestion pipeline: fetch, validate, merge, persist.
//!
//! One linear sequence per feed, invoked once from the sync command. Every
//! fatal error aborts before the store file is touched; only a successful
//! run replaces it (atomically, via the writer's staging).

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tracing::info;

use crate::config::FeedConfig;
use crate::fetcher::Fetcher;
use crate::merge::{self, MergeStats};
use crate::store::{self, IndicatorMap, Meta, StoreFormat};

/// Outcome of one feed's sync
#[derive(Debug)]
pub struct SyncOutcome {
    pub feed: String,
    pub stats: MergeStats,
    /// False on a dry run
    pub written: bool,
}

/// Run the pipeline for one feed.
pub async fn run(feed: &FeedConfig, data_dir: &Path, dry_run: bool) -> Result<SyncOutcome> {
    let store_path = feed.store_path(data_dir);

    let existing = store::load(&store_path, feed.store_format, feed.validate)
        .with_context(|| format!("Failed to load store for {}", feed.name))?;
    info!(
        "Loaded {} stored indicators from {}",
        existing.len(),
        store_path.display()
    );

    let fetcher = Fetcher::new(feed.timeout_secs)?;
    let fetched = fetcher.fetch(feed).await?;

    let collected = Utc::now();
    let batch = batch_with_metadata(fetched.values, feed, collected);

    let (merged, stats) = merge::merge(existing, batch);

    if dry_run {
        info!(
            "Dry run - not writing {} indicators to {}",
            stats.total,
            store_path.display()
        );
        return Ok(SyncOutcome {
            feed: feed.name.clone(),
            stats,
            written: false,
        });
    }

    let fallback = Meta {
        indicator_type: feed.indicator_type.clone(),
        source: feed.name.clone(),
        collected,
    };
    store::save(&store_path, &merged, feed.store_format, &fallback)
        .with_context(|| format!("Failed to write store for {}", feed.name))?;

    info!(
        "Wrote {} indicators to {}",
        stats.total,
        store_path.display()
    );

    Ok(SyncOutcome {
        feed: feed.name.clone(),
        stats,
        written: true,
    })
}

/// Stamp a fetched batch with this run's metadata. Metadata is only carried
/// for the `full` layout; the other layouts persist bare values.
fn batch_with_metadata(
    values: std::collections::BTreeSet<String>,
    feed: &FeedConfig,
    collected: chrono::DateTime<Utc>,
) -> IndicatorMap {
    values
        .into_iter()
        .map(|value| {
            let meta = match feed.store_format {
                StoreFormat::Full => Some(Meta {
                    indicator_type: feed.indicator_type.clone(),
                    source: feed.name.clone(),
                    collected,
                }),
                _ => None,
            };
            (value, meta)
        })
        .collect()
}
