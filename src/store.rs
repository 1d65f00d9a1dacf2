//! Persistent indicator stores.
//!
//! A store is a flat file holding the cumulative, deduplicated set of
//! indicator values collected across runs. Three layouts are supported:
//! a bare value-per-line list, a single-column CSV, and a four-column CSV
//! carrying type, provenance and collection-time metadata.
//!
//! Loads tolerate a missing file (empty store) and skip malformed rows.
//! Writes are staged to a temporary file in the target directory and
//! renamed over the previous store only on success, so a failed run never
//! truncates existing data.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::IocsyncError;
use crate::validation::is_valid_ipv4;

/// Header row of the single-column layout
pub const VALUES_HEADER: &str = "IndicatorValue";
/// Header row of the four-column layout
pub const FULL_HEADER: &str = "IndicatorType,IndicatorValue,Source,CollectedUTC";

/// On-disk store layout
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    /// One bare value per line, no header
    Plain,
    /// CSV with an `IndicatorValue` header
    #[default]
    Values,
    /// CSV with type, value, source and collection timestamp columns
    Full,
}

/// Metadata carried by the `full` layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub indicator_type: String,
    pub source: String,
    pub collected: DateTime<Utc>,
}

/// In-memory store: value -> optional metadata, ordered lexicographically
/// so every write is canonical.
pub type IndicatorMap = BTreeMap<String, Option<Meta>>;

/// Load a store from disk. A missing file yields an empty store.
///
/// With `validate` set, previously stored values that are not well-formed
/// IPv4 addresses are dropped, so a store written before validation existed
/// gets cleaned up on the next run.
pub fn load(path: &Path, format: StoreFormat, validate: bool) -> Result<IndicatorMap> {
    if !path.exists() {
        return Ok(IndicatorMap::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| IocsyncError::Storage(format!("{}: {}", path.display(), e)))?;

    Ok(parse(&content, format, validate))
}

fn parse(content: &str, format: StoreFormat, validate: bool) -> IndicatorMap {
    let mut indicators = IndicatorMap::new();
    let mut skipped = 0usize;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line == VALUES_HEADER || line == FULL_HEADER {
            continue;
        }

        let (value, meta) = match format {
            StoreFormat::Plain | StoreFormat::Values => (line, None),
            StoreFormat::Full => {
                let columns: Vec<&str> = line.split(',').collect();
                if columns.len() != 4 {
                    skipped += 1;
                    continue;
                }
                let collected = match DateTime::parse_from_rfc3339(columns[3].trim()) {
                    Ok(ts) => ts.with_timezone(&Utc),
                    Err(_) => {
                        skipped += 1;
                        continue;
                    }
                };
                (
                    columns[1].trim(),
                    Some(Meta {
                        indicator_type: columns[0].trim().to_string(),
                        source: columns[2].trim().to_string(),
                        collected,
                    }),
                )
            }
        };

        if value.is_empty() || (validate && !is_valid_ipv4(value)) {
            skipped += 1;
            continue;
        }

        indicators.insert(value.to_string(), meta);
    }

    if skipped > 0 {
        warn!("Skipped {} malformed store rows", skipped);
    }

    indicators
}

/// Serialize a store in the given layout, values in ascending lexicographic
/// order. `full` rows missing metadata fall back to `fallback`.
pub fn render(indicators: &IndicatorMap, format: StoreFormat, fallback: &Meta) -> String {
    let mut out = String::new();

    match format {
        StoreFormat::Plain => {
            for value in indicators.keys() {
                out.push_str(value);
                out.push('\n');
            }
        }
        StoreFormat::Values => {
            out.push_str(VALUES_HEADER);
            out.push('\n');
            for value in indicators.keys() {
                out.push_str(value);
                out.push('\n');
            }
        }
        StoreFormat::Full => {
            out.push_str(FULL_HEADER);
            out.push('\n');
            for (value, meta) in indicators {
                let meta = meta.as_ref().unwrap_or(fallback);
                out.push_str(&format!(
                    "{},{},{},{}\n",
                    meta.indicator_type,
                    value,
                    meta.source,
                    meta.collected.to_rfc3339_opts(SecondsFormat::Secs, true)
                ));
            }
        }
    }

    out
}

/// Write a store to disk, replacing any previous content.
///
/// The parent directory is created on demand. The content is staged to a
/// temporary file and atomically renamed over the target, so a failure at
/// any point leaves the previous store untouched.
pub fn save(
    path: &Path,
    indicators: &IndicatorMap,
    format: StoreFormat,
    fallback: &Meta,
) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .map_err(|e| IocsyncError::Storage(format!("{}: {}", parent.display(), e)))?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| IocsyncError::Storage(format!("{}: {}", parent.display(), e)))?;

    let content = render(indicators, format, fallback);
    temp.write_all(content.as_bytes())
        .map_err(|e| IocsyncError::Storage(format!("{}: {}", path.display(), e)))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| IocsyncError::Storage(format!("{}: {}", path.display(), e)))?;

    temp.persist(path)
        .map_err(|e| IocsyncError::Storage(format!("{}: {}", path.display(), e)))?;

    Ok(())
}
