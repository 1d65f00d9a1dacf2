//! HTTP fetcher for indicator feeds.

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{FeedConfig, FeedKind};
use crate::error::IocsyncError;
use crate::validation::{is_valid_ipv4, window_duration};

/// Maximum accepted response body (16 MB). A full indicator export is a few
/// MB, so this provides ample margin.
const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Result of fetching one feed
#[derive(Debug)]
pub struct FetchResult {
    /// Candidate values, post trim/dedup/validation
    pub values: BTreeSet<String>,
    /// Records seen before filtering
    pub raw_count: usize,
}

/// HTTP client for fetching indicator feeds
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a new fetcher with the given request timeout
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(format!("iocsync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IocsyncError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetch one feed and decode its indicators.
    ///
    /// The credential is resolved before any network I/O; a missing key is a
    /// configuration error, not a transport one. The single GET either
    /// succeeds or fails the run: non-success status, timeout and oversize
    /// bodies are all fatal, with no retry.
    pub async fn fetch(&self, feed: &FeedConfig) -> Result<FetchResult> {
        let api_key = feed.api_key()?;

        let mut request = self
            .client
            .get(&feed.url)
            .header(&feed.api_key_header, api_key.as_str())
            .query(&[("types", feed.indicator_type.as_str())]);

        if let Some(ref window) = feed.window {
            let since = Utc::now() - window_duration(window)?;
            request = request.query(&[(
                "modified_since",
                since.to_rfc3339_opts(SecondsFormat::Secs, true),
            )]);
        }
        if let Some(min_confidence) = feed.min_confidence {
            request = request.query(&[("min_confidence", min_confidence.to_string())]);
        }
        if let Some(limit) = feed.limit {
            request = request.query(&[("limit", limit.to_string())]);
        }
        if let Some(ref format) = feed.format {
            request = request.query(&[("format", format.as_str())]);
        }

        info!("Fetching {}...", feed.name);

        let response = request
            .send()
            .await
            .map_err(|e| IocsyncError::Transport(format!("{}: {}", feed.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IocsyncError::Transport(format!("{}: HTTP {}", feed.name, status)).into());
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > MAX_BODY_SIZE {
                return Err(IocsyncError::Transport(format!(
                    "{}: response too large: {} bytes (max: {} bytes)",
                    feed.name, content_length, MAX_BODY_SIZE
                ))
                .into());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| IocsyncError::Transport(format!("{}: {}", feed.name, e)))?;

        if body.len() > MAX_BODY_SIZE {
            return Err(IocsyncError::Transport(format!(
                "{}: response too large: {} bytes (max: {} bytes)",
                feed.name,
                body.len(),
                MAX_BODY_SIZE
            ))
            .into());
        }

        let result = match feed.kind {
            FeedKind::Export => parse_export(&body, feed.validate),
            FeedKind::Blacklist => parse_blacklist(&body, &feed.indicator_type, feed.validate)?,
        };

        info!(
            "Fetched {} - {} indicators ({} raw)",
            feed.name,
            result.values.len(),
            result.raw_count
        );

        Ok(result)
    }
}

/// Parse a newline-delimited export payload: trim, drop empties, dedup.
pub fn parse_export(content: &str, validate: bool) -> FetchResult {
    let mut values = BTreeSet::new();
    let mut raw_count = 0usize;
    let mut rejected = 0usize;

    for line in content.lines() {
        let candidate = line.trim();
        if candidate.is_empty() {
            continue;
        }
        raw_count += 1;
        if validate && !is_valid_ipv4(candidate) {
            rejected += 1;
            continue;
        }
        values.insert(candidate.to_string());
    }

    if rejected > 0 {
        debug!("Dropped {} malformed candidates", rejected);
    }

    FetchResult { values, raw_count }
}

/// One record of a JSON blacklist payload
#[derive(Debug, Deserialize)]
struct BlacklistRecord {
    #[serde(default)]
    indicator: Option<String>,
    #[serde(rename = "type", default)]
    indicator_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Parse a JSON blacklist payload.
///
/// Accepts either an object carrying a `results` list or a top-level list;
/// any other shape is fatal. Records are kept when their declared type
/// matches the requested one, their value is present and non-empty, and
/// their status does not mark them expired.
pub fn parse_blacklist(content: &str, indicator_type: &str, validate: bool) -> Result<FetchResult> {
    let document: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| IocsyncError::Format(format!("invalid JSON: {}", e)))?;

    let records: &[serde_json::Value] = match &document {
        serde_json::Value::Object(map) => match map.get("results") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(
                    IocsyncError::Format("object is missing a results list".to_string()).into(),
                )
            }
        },
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(
                IocsyncError::Format("body is neither an object nor a list".to_string()).into(),
            )
        }
    };

    let raw_count = records.len();
    let mut values = BTreeSet::new();
    let mut rejected = 0usize;

    for item in records {
        let Ok(record) = serde_json::from_value::<BlacklistRecord>(item.clone()) else {
            rejected += 1;
            continue;
        };
        let Some(candidate) = record
            .indicator
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        else {
            rejected += 1;
            continue;
        };
        if record.indicator_type.as_deref() != Some(indicator_type) {
            rejected += 1;
            continue;
        }
        if record
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("expired"))
        {
            rejected += 1;
            continue;
        }
        if validate && !is_valid_ipv4(candidate) {
            rejected += 1;
            continue;
        }
        values.insert(candidate.to_string());
    }

    if rejected > 0 {
        debug!("Dropped {} filtered candidates", rejected);
    }

    Ok(FetchResult { values, raw_count })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Generate valid IPv4 address strings
    fn ipv4_string_strategy() -> impl Strategy<Value = String> {
        (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
            .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d))
    }

    /// Generate export payloads mixing valid addresses, noise and blanks
    fn export_content_strategy(max_lines: usize) -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                ipv4_string_strategy(),
                "[a-z0-9.-]{0,20}",
                Just(String::new()),
                Just("   ".to_string()),
            ],
            0..max_lines,
        )
        .prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        /// A generated dotted-quad always survives the export parser
        #[test]
        fn prop_parse_export_accepts_valid_ipv4(ip in ipv4_string_strategy()) {
            let result = parse_export(&format!("{}\n", ip), true);
            prop_assert!(result.values.contains(&ip));
        }

        /// The export parser never panics on arbitrary content
        #[test]
        fn prop_parse_export_arbitrary_no_panic(content in export_content_strategy(100)) {
            let _ = parse_export(&content, true);
        }

        /// With validation on, everything kept is a well-formed IPv4
        #[test]
        fn prop_parse_export_only_valid_survive(content in export_content_strategy(50)) {
            let result = parse_export(&content, true);
            for value in &result.values {
                prop_assert!(is_valid_ipv4(value));
            }
        }

        /// An expired record never survives, no matter how often it appears
        #[test]
        fn prop_expired_never_survives(ip in ipv4_string_strategy(), copies in 1usize..10) {
            let records: Vec<String> = (0..copies)
                .map(|_| format!(r#"{{"indicator": "{}", "type": "IPv4", "status": "Expired"}}"#, ip))
                .collect();
            let content = format!(r#"{{"results": [{}]}}"#, records.join(","));
            let result = parse_blacklist(&content, "IPv4", true).unwrap();
            prop_assert!(!result.values.contains(&ip));
        }

        /// The blacklist parser never panics on arbitrary JSON-ish input
        #[test]
        fn prop_parse_blacklist_arbitrary_no_panic(content in ".{0,200}") {
            let _ = parse_blacklist(&content, "IPv4", true);
        }
    }
}
