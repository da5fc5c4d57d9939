//! State-duration decomposition.
//!
//! Each lifecycle event starts a state that lasts until the next event, or
//! until the observation horizon for the last one. The horizon is the
//! decommission time when the asset has left the fleet, otherwise `now`.
//!
//! Idle time is summed from explicitly idle intervals like every other
//! category. It is never derived as a remainder of the total span.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, warn};

use crate::models::{Asset, Decomposition, LifecycleEvent, StateDurations, StateInterval};
use crate::services::normalizer::NormalizedEvents;

/// Allowed drift between summed durations and the observed span.
const SPAN_TOLERANCE_MS: i64 = 1_000;

/// Decomposes one asset's sorted events into category durations.
///
/// `decommissioned_at` comes from the fleet registry; a decommission event in
/// the sequence ends the window too, whichever is earlier.
pub fn decompose(
    asset_id: &str,
    events: &[LifecycleEvent],
    decommissioned_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Decomposition {
    let event_decommission = events
        .iter()
        .find(|e| e.status().is_decommissioned())
        .map(|e| e.timestamp);
    let decommission = match (decommissioned_at, event_decommission) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    let horizon = decommission.unwrap_or(now);

    let Some(first) = events.first() else {
        return Decomposition::empty(asset_id, horizon, decommission.is_some());
    };

    let mut decomposition = Decomposition::empty(asset_id, horizon, decommission.is_some());
    decomposition.first_event = Some(first.timestamp);

    if horizon < first.timestamp {
        warn!(
            asset_id,
            first_event = %first.timestamp,
            horizon = %horizon,
            "Observation horizon precedes first event, durations clamped to zero"
        );
        decomposition.clamped_intervals = 1;
        return decomposition;
    }

    let mut durations = StateDurations::default();
    let mut intervals: Vec<StateInterval> = Vec::new();

    for (idx, event) in events.iter().enumerate() {
        if event.timestamp >= horizon {
            break;
        }

        let next = events
            .get(idx + 1)
            .map(|e| e.timestamp)
            .unwrap_or(horizon)
            .min(horizon);

        let mut millis = (next - event.timestamp).num_milliseconds();
        if millis < 0 {
            warn!(
                asset_id,
                start = %event.timestamp,
                end = %next,
                "Negative interval duration clamped to zero"
            );
            decomposition.clamped_intervals += 1;
            millis = 0;
        }
        if millis == 0 {
            continue;
        }

        let category = event.category();
        durations.add(category, millis);

        let end = if next >= horizon && decommission.is_none() {
            None
        } else {
            Some(next)
        };

        match intervals.last_mut() {
            Some(last) if last.category == category && last.end == Some(event.timestamp) => {
                last.end = end;
            }
            _ => intervals.push(StateInterval {
                asset_id: asset_id.to_string(),
                category,
                start: event.timestamp,
                end,
            }),
        }
    }

    decomposition.durations = durations;
    decomposition.intervals = intervals;

    let drift = (decomposition.durations.total_ms() - decomposition.span_ms()).abs();
    if drift > SPAN_TOLERANCE_MS {
        error!(
            asset_id,
            drift_ms = drift,
            "Decomposed durations do not cover the observation span"
        );
    }

    decomposition
}

/// Decomposes every asset known to the registry or present in the events.
///
/// Registry assets without events yield empty decompositions so callers can
/// report them; the scorer skips them. Output is ordered by asset id.
pub fn decompose_fleet(
    normalized: &NormalizedEvents,
    registry: &[Asset],
    now: DateTime<Utc>,
) -> Vec<Decomposition> {
    let assets: BTreeMap<&str, &Asset> = registry
        .iter()
        .map(|a| (a.asset_id.trim(), a))
        .filter(|(id, _)| !id.is_empty())
        .collect();

    let ids: BTreeSet<&str> = assets
        .keys()
        .copied()
        .chain(normalized.by_asset.keys().map(String::as_str))
        .collect();

    ids.into_iter()
        .map(|asset_id| {
            let asset = assets.get(asset_id);
            let mut decomposition = decompose(
                asset_id,
                normalized.events_for(asset_id),
                asset.and_then(|a| a.decommission_time()),
                now,
            );
            decomposition.label = asset.and_then(|a| a.label.clone());
            decomposition
        })
        .collect()
}
