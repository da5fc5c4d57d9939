//! Event normalization.
//!
//! Cleans raw lifecycle events and groups them into per-asset, chronologically
//! ordered sequences ready for decomposition.

use serde::Serialize;
use shared::time::parse_timestamp;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::models::{LifecycleEvent, RawLifecycleEvent};

/// Per-asset sorted event sequences plus the count of dropped events.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NormalizedEvents {
    pub by_asset: BTreeMap<String, Vec<LifecycleEvent>>,
    /// Events dropped for a missing/unparsable timestamp or a blank asset id.
    pub excluded: usize,
}

impl NormalizedEvents {
    pub fn events_for(&self, asset_id: &str) -> &[LifecycleEvent] {
        self.by_asset.get(asset_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn event_count(&self) -> usize {
        self.by_asset.values().map(Vec::len).sum()
    }
}

/// Groups events by asset and sorts each group by timestamp.
///
/// Ties keep their input order. Malformed events are skipped, never reported
/// as errors.
pub fn normalize_events(raw: &[RawLifecycleEvent]) -> NormalizedEvents {
    let mut result = NormalizedEvents::default();

    for event in raw {
        let asset_id = event.asset_id.trim();
        if asset_id.is_empty() {
            result.excluded += 1;
            continue;
        }

        let Some(timestamp) = event.timestamp.as_deref().and_then(parse_timestamp) else {
            result.excluded += 1;
            continue;
        };

        result
            .by_asset
            .entry(asset_id.to_string())
            .or_default()
            .push(LifecycleEvent::new(asset_id, timestamp, event.state_label.trim()));
    }

    for events in result.by_asset.values_mut() {
        // sort_by_key is stable
        events.sort_by_key(|e| e.timestamp);
    }

    if result.excluded > 0 {
        warn!(
            excluded = result.excluded,
            total = raw.len(),
            "Dropped lifecycle events without a usable timestamp or asset id"
        );
    }
    debug!(
        assets = result.by_asset.len(),
        events = result.event_count(),
        "Normalized lifecycle events"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn raw(asset: &str, ts: Option<&str>, label: &str) -> RawLifecycleEvent {
        RawLifecycleEvent {
            asset_id: asset.to_string(),
            timestamp: ts.map(str::to_string),
            state_label: label.to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        let result = normalize_events(&[]);
        assert!(result.by_asset.is_empty());
        assert_eq!(result.excluded, 0);
    }

    #[test]
    fn test_groups_and_sorts_per_asset() {
        let events = vec![
            raw("AAA1111", Some("2024-01-10"), "Rented"),
            raw("BBB2222", Some("2024-01-05"), "Workshop"),
            raw("AAA1111", Some("2024-01-01"), "Available"),
            raw("AAA1111", Some("2024-01-20"), "Workshop"),
        ];

        let result = normalize_events(&events);
        assert_eq!(result.by_asset.len(), 2);

        let labels: Vec<&str> = result
            .events_for("AAA1111")
            .iter()
            .map(|e| e.state_label.as_str())
            .collect();
        assert_eq!(labels, vec!["Available", "Rented", "Workshop"]);
        assert_eq!(result.events_for("BBB2222").len(), 1);
        assert_eq!(result.event_count(), 4);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let events = vec![
            raw("AAA1111", Some("2024-01-10 08:00:00"), "first"),
            raw("AAA1111", Some("2024-01-01 08:00:00"), "earliest"),
            raw("AAA1111", Some("2024-01-10 08:00:00"), "second"),
            raw("AAA1111", Some("2024-01-10T08:00:00Z"), "third"),
        ];

        let result = normalize_events(&events);
        let labels: Vec<&str> = result
            .events_for("AAA1111")
            .iter()
            .map(|e| e.state_label.as_str())
            .collect();
        assert_eq!(labels, vec!["earliest", "first", "second", "third"]);
    }

    #[test]
    fn test_drops_unusable_events_and_counts_them() {
        let events = vec![
            raw("AAA1111", None, "Rented"),
            raw("AAA1111", Some("not a date"), "Rented"),
            raw("   ", Some("2024-01-01"), "Rented"),
            raw("AAA1111", Some("2024-01-01"), "Rented"),
        ];

        let result = normalize_events(&events);
        assert_eq!(result.excluded, 3);
        assert_eq!(result.event_count(), 1);
        assert_eq!(
            result.events_for("AAA1111")[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_trims_asset_ids() {
        let events = vec![
            raw(" AAA1111 ", Some("2024-01-02"), "Rented"),
            raw("AAA1111", Some("2024-01-01"), "Available"),
        ];

        let result = normalize_events(&events);
        assert_eq!(result.by_asset.len(), 1);
        assert_eq!(result.events_for("AAA1111").len(), 2);
    }

    #[test]
    fn test_unknown_asset_has_no_events() {
        let result = normalize_events(&[]);
        assert!(result.events_for("ZZZ0000").is_empty());
    }
}
