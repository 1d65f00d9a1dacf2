//! Status command implementation.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use std::path::Path;

use crate::config::Config;
use crate::state::SyncState;
use crate::store;

/// Run the status command
pub fn run(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let state = SyncState::load(&config.state_path()).unwrap_or_default();

    println!();
    println!("══════════════════════════════════════════════════════════════════");
    println!(" IOCSYNC STORE STATISTICS");
    println!("══════════════════════════════════════════════════════════════════");
    println!();

    println!(" FEED               STATE      ENTRIES      SIZE         FETCHED");
    println!(" ────────────────── ────────── ──────────── ──────────── ────────────");

    let mut total_entries = 0usize;
    for feed in &config.feeds {
        let path = feed.store_path(&config.data_dir);
        let entries = store::load(&path, feed.store_format, false)
            .map(|indicators| indicators.len())
            .unwrap_or(0);
        total_entries += entries;
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let fetched = state
            .feed(&feed.name)
            .map(|f| format_count(f.fetched))
            .unwrap_or_else(|| "-".to_string());
        let feed_state = if feed.enabled { "enabled" } else { "disabled" };

        println!(
            " {:<18} {:<10} {:>12} {:>12} {:>12}",
            truncate(&feed.name, 18),
            feed_state,
            format_count(entries),
            format_bytes(size),
            fetched,
        );
    }

    println!(" ────────────────── ────────── ──────────── ──────────── ────────────");
    println!(
        " {:<18} {:<10} {:>12}",
        "TOTAL",
        "",
        format_count(total_entries)
    );
    println!();

    if let Some(last_sync) = state.last_sync {
        let local: DateTime<Local> = last_sync.into();
        let ago = format_duration_ago(last_sync);
        println!(
            " Last sync: {} ({})",
            local.format("%Y-%m-%d %H:%M:%S"),
            ago
        );
    } else {
        println!(" Last sync: never");
    }

    println!("══════════════════════════════════════════════════════════════════");
    println!();

    Ok(())
}

/// Format a count with K/M suffix
fn format_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Format bytes in human-readable form
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format duration since a timestamp
fn format_duration_ago(dt: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    let seconds = duration.num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86400)
    }
}

/// Truncate a string to a maximum length
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
