//! Persistent sync state.
//!
//! A small JSON file next to the stores recording when the last sync ran and
//! what each feed contributed. Read by the status command; absence is never
//! an error.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::IocsyncError;
use crate::merge::MergeStats;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncState {
    pub last_sync: Option<DateTime<Utc>>,
    pub feeds: Vec<FeedState>,
}

/// Counters from the last sync of one feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedState {
    pub name: String,
    pub fetched: usize,
    pub added: usize,
    pub total: usize,
}

impl SyncState {
    /// Load state from file; missing or unreadable state starts fresh
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| IocsyncError::Storage(format!("{}: {}", path.display(), e)))?;
            Ok(serde_json::from_str(&content).unwrap_or_default())
        } else {
            Ok(Self::default())
        }
    }

    /// Save state atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .map_err(|e| IocsyncError::Storage(format!("{}: {}", parent.display(), e)))?;

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| IocsyncError::Storage(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| IocsyncError::Storage(format!("{}: {}", parent.display(), e)))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| IocsyncError::Storage(format!("{}: {}", path.display(), e)))?;
        temp.persist(path)
            .map_err(|e| IocsyncError::Storage(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Record the outcome of one feed's sync
    pub fn record(&mut self, name: &str, stats: MergeStats) {
        self.feeds.retain(|f| f.name != name);
        self.feeds.push(FeedState {
            name: name.to_string(),
            fetched: stats.fetched,
            added: stats.added,
            total: stats.total,
        });
        self.feeds.sort_by(|a, b| a.name.cmp(&b.name));
        self.last_sync = Some(Utc::now());
    }

    /// Counters for one feed, if it ever synced
    pub fn feed(&self, name: &str) -> Option<&FeedState> {
        self.feeds.iter().find(|f| f.name == name)
    }
}
