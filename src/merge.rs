//! Set union of stored and freshly fetched indicators.

use crate::store::IndicatorMap;

/// Counts reported by one merge, used for the run summary and the state file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Values already persisted before the run
    pub existing: usize,
    /// Values in the fetched batch, post trim/dedup/validation
    pub fetched: usize,
    /// Values the batch contributed that were not yet stored
    pub added: usize,
    /// Values in the merged result
    pub total: usize,
}

/// Union keyed on the indicator value.
///
/// A value present in the fetched batch takes the batch's metadata (newest
/// write wins); values absent from the batch keep their stored metadata, so
/// merging an empty batch is the identity.
pub fn merge(existing: IndicatorMap, fetched: IndicatorMap) -> (IndicatorMap, MergeStats) {
    let existing_count = existing.len();
    let fetched_count = fetched.len();

    let mut merged = existing;
    let mut added = 0usize;
    for (value, meta) in fetched {
        if merged.insert(value, meta).is_none() {
            added += 1;
        }
    }

    let stats = MergeStats {
        existing: existing_count,
        fetched: fetched_count,
        added,
        total: merged.len(),
    };

    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Meta;
    use chrono::{TimeZone, Utc};

    fn map(values: &[&str]) -> IndicatorMap {
        values.iter().map(|v| (v.to_string(), None)).collect()
    }

    fn meta(source: &str, hour: u32) -> Option<Meta> {
        Some(Meta {
            indicator_type: "IPv4".to_string(),
            source: source.to_string(),
            collected: Utc.with_ymd_and_hms(2026, 8, 8, hour, 0, 0).unwrap(),
        })
    }

    #[test]
    fn test_union_correctness() {
        let existing = map(&["1.1.1.1", "2.2.2.2"]);
        let fetched = map(&["2.2.2.2", "3.3.3.3"]);

        let (merged, stats) = merge(existing, fetched);

        let values: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(values, vec!["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
        assert_eq!(stats.existing, 2);
        assert_eq!(stats.fetched, 2);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.total, 3);
    }

    #[test]
    fn test_empty_fetch_is_identity() {
        let existing = map(&["1.1.1.1", "2.2.2.2"]);
        let (merged, stats) = merge(existing.clone(), IndicatorMap::new());
        assert_eq!(merged, existing);
        assert_eq!(stats.fetched, 0);
        assert_eq!(stats.added, 0);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_empty_store_takes_fetched_set() {
        let fetched = map(&["8.8.8.8"]);
        let (merged, stats) = merge(IndicatorMap::new(), fetched.clone());
        assert_eq!(merged, fetched);
        assert_eq!(stats.existing, 0);
        assert_eq!(stats.added, 1);
    }

    #[test]
    fn test_batch_metadata_wins_on_collision() {
        let mut existing = IndicatorMap::new();
        existing.insert("1.1.1.1".to_string(), meta("old_feed", 1));

        let mut fetched = IndicatorMap::new();
        fetched.insert("1.1.1.1".to_string(), meta("new_feed", 2));

        let (merged, stats) = merge(existing, fetched);
        assert_eq!(merged["1.1.1.1"].as_ref().unwrap().source, "new_feed");
        assert_eq!(stats.added, 0);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn test_stored_metadata_kept_when_absent_from_batch() {
        let mut existing = IndicatorMap::new();
        existing.insert("1.1.1.1".to_string(), meta("old_feed", 1));

        let fetched = map(&["2.2.2.2"]);
        let (merged, _) = merge(existing, fetched);
        assert_eq!(merged["1.1.1.1"].as_ref().unwrap().source, "old_feed");
        assert!(merged["2.2.2.2"].is_none());
    }

    #[test]
    fn test_summary_counts_for_single_new_value() {
        // existing {1.1.1.1}; batch {8.8.8.8} (after trim/dedup)
        let (merged, stats) = merge(map(&["1.1.1.1"]), map(&["8.8.8.8"]));
        assert_eq!(stats.existing, 1);
        assert_eq!(stats.fetched, 1);
        assert_eq!(stats.total, 2);
        let values: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(values, vec!["1.1.1.1", "8.8.8.8"]);
    }
}
