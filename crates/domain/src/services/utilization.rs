//! Utilization scoring and fleet ranking.

use tracing::debug;

use crate::models::{
    ClassBreakdown, Decomposition, FleetUtilizationSummary, StateCategory, StateDurations,
    UtilizationClass, UtilizationScore, UtilizationThresholds,
};

/// Weight of maintenance share subtracted from utilization in the ranking score.
const MAINTENANCE_PENALTY: f64 = 0.5;

fn share_pct(part: f64, total: f64) -> f64 {
    shared::numeric::percentage(part, total).clamp(0.0, 100.0)
}

/// Maps a utilization percentage onto its class.
pub fn classify(utilization_pct: f64, thresholds: &UtilizationThresholds) -> UtilizationClass {
    if utilization_pct >= thresholds.excellent_pct {
        UtilizationClass::Excellent
    } else if utilization_pct >= thresholds.good_pct {
        UtilizationClass::Good
    } else if utilization_pct >= thresholds.warning_pct {
        UtilizationClass::Warning
    } else {
        UtilizationClass::Critical
    }
}

/// Scores raw category durations.
pub fn score_durations(
    asset_id: &str,
    durations: &StateDurations,
    thresholds: &UtilizationThresholds,
) -> UtilizationScore {
    let total_days = durations.total_days();
    let rented_days = durations.days(StateCategory::Rented);
    let maintenance_days = durations.days(StateCategory::Maintenance);

    let utilization_pct = share_pct(rented_days, total_days);
    let maintenance_pct = share_pct(maintenance_days, total_days);

    UtilizationScore {
        asset_id: asset_id.to_string(),
        label: None,
        total_days,
        rented_days,
        maintenance_days,
        idle_days: (total_days - rented_days - maintenance_days).max(0.0),
        measured_idle_days: None,
        utilization_pct,
        maintenance_pct,
        score: utilization_pct - MAINTENANCE_PENALTY * maintenance_pct,
        classification: classify(utilization_pct, thresholds),
    }
}

/// Scores one decomposed asset. Assets without events have no score.
pub fn score(
    decomposition: &Decomposition,
    thresholds: &UtilizationThresholds,
) -> Option<UtilizationScore> {
    if !decomposition.has_events() {
        return None;
    }

    let mut result = score_durations(&decomposition.asset_id, &decomposition.durations, thresholds);
    result.label = decomposition.label.clone();
    if decomposition.has_idle_intervals() {
        result.measured_idle_days = Some(decomposition.durations.days(StateCategory::Idle));
    }
    Some(result)
}

/// Scores every decomposition that has events, preserving input order.
pub fn score_fleet(
    decompositions: &[Decomposition],
    thresholds: &UtilizationThresholds,
) -> Vec<UtilizationScore> {
    let scores: Vec<UtilizationScore> = decompositions
        .iter()
        .filter_map(|d| score(d, thresholds))
        .collect();

    debug!(
        assets = decompositions.len(),
        scored = scores.len(),
        "Scored fleet utilization"
    );

    scores
}

/// Sorts scores best first. Ties are broken by asset id.
pub fn rank_by_score(scores: &mut [UtilizationScore]) {
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.asset_id.cmp(&b.asset_id))
    });
}

pub fn summarize_fleet(scores: &[UtilizationScore]) -> FleetUtilizationSummary {
    if scores.is_empty() {
        return FleetUtilizationSummary::default();
    }

    let count = scores.len() as f64;
    let mut by_class = ClassBreakdown::default();
    for s in scores {
        by_class.record(s.classification);
    }

    FleetUtilizationSummary {
        assets: scores.len(),
        average_utilization_pct: scores.iter().map(|s| s.utilization_pct).sum::<f64>() / count,
        average_maintenance_pct: scores.iter().map(|s| s.maintenance_pct).sum::<f64>() / count,
        by_class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const DAY_MS: i64 = 86_400_000;

    fn durations(rented: i64, maintenance: i64, idle: i64, unknown: i64) -> StateDurations {
        StateDurations {
            rented_ms: rented * DAY_MS,
            maintenance_ms: maintenance * DAY_MS,
            idle_ms: idle * DAY_MS,
            unknown_ms: unknown * DAY_MS,
        }
    }

    fn scored(asset_id: &str, score: f64) -> UtilizationScore {
        let mut s = score_durations(asset_id, &durations(1, 0, 0, 0), &Default::default());
        s.score = score;
        s
    }

    #[test]
    fn test_scenario_percentages() {
        let result = score_durations("ABC1D23", &durations(15, 5, 0, 0), &Default::default());

        assert_eq!(result.total_days, 20.0);
        assert_eq!(result.rented_days, 15.0);
        assert_eq!(result.maintenance_days, 5.0);
        assert_eq!(result.idle_days, 0.0);
        assert_eq!(result.utilization_pct, 75.0);
        assert_eq!(result.maintenance_pct, 25.0);
        assert_eq!(result.score, 62.5);
        assert_eq!(result.classification, UtilizationClass::Good);
    }

    #[test]
    fn test_zero_total_is_zero_not_nan() {
        let result = score_durations("ABC1D23", &StateDurations::default(), &Default::default());
        assert_eq!(result.utilization_pct, 0.0);
        assert_eq!(result.maintenance_pct, 0.0);
        assert_eq!(result.classification, UtilizationClass::Critical);
    }

    #[test]
    fn test_idle_days_is_display_remainder() {
        let result = score_durations("ABC1D23", &durations(4, 2, 3, 1), &Default::default());
        assert_eq!(result.total_days, 10.0);
        assert_eq!(result.idle_days, 4.0);
    }

    #[test]
    fn test_percentages_bounded() {
        for (r, m, i, u) in [(0, 0, 0, 1), (10, 0, 0, 0), (0, 10, 0, 0), (3, 7, 11, 13), (1, 0, 0, 0)] {
            let result = score_durations("X", &durations(r, m, i, u), &Default::default());
            assert!((0.0..=100.0).contains(&result.utilization_pct));
            assert!((0.0..=100.0).contains(&result.maintenance_pct));
        }
    }

    #[test]
    fn test_classification_boundaries() {
        let thresholds = UtilizationThresholds::default();
        assert_eq!(classify(80.0, &thresholds), UtilizationClass::Excellent);
        assert_eq!(classify(79.9, &thresholds), UtilizationClass::Good);
        assert_eq!(classify(60.0, &thresholds), UtilizationClass::Good);
        assert_eq!(classify(40.0, &thresholds), UtilizationClass::Warning);
        assert_eq!(classify(39.9, &thresholds), UtilizationClass::Critical);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = UtilizationThresholds {
            excellent_pct: 90.0,
            good_pct: 70.0,
            warning_pct: 50.0,
        };
        assert_eq!(classify(85.0, &thresholds), UtilizationClass::Good);
        assert_eq!(classify(45.0, &thresholds), UtilizationClass::Critical);
    }

    #[test]
    fn test_score_skips_assets_without_events() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let empty = Decomposition::empty("ABC1D23", now, false);
        assert!(score(&empty, &Default::default()).is_none());
        assert!(score_fleet(&[empty], &Default::default()).is_empty());
    }

    #[test]
    fn test_score_carries_label_and_measured_idle() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut decomposition = Decomposition::empty("ABC1D23", start, false);
        decomposition.first_event = Some(start);
        decomposition.label = Some("Onix 1.0".to_string());
        decomposition.durations = durations(6, 0, 4, 0);
        decomposition.intervals.push(crate::models::StateInterval {
            asset_id: "ABC1D23".to_string(),
            category: StateCategory::Idle,
            start,
            end: None,
        });

        let result = score(&decomposition, &Default::default()).unwrap();
        assert_eq!(result.label.as_deref(), Some("Onix 1.0"));
        assert_eq!(result.measured_idle_days, Some(4.0));
    }

    #[test]
    fn test_rank_by_score_descending_with_id_ties() {
        let mut scores = vec![
            scored("CCC", 50.0),
            scored("AAA", 80.0),
            scored("BBB", 50.0),
            scored("DDD", -10.0),
        ];

        rank_by_score(&mut scores);

        let ids: Vec<&str> = scores.iter().map(|s| s.asset_id.as_str()).collect();
        assert_eq!(ids, vec!["AAA", "BBB", "CCC", "DDD"]);
    }

    #[test]
    fn test_summarize_fleet() {
        let thresholds = UtilizationThresholds::default();
        let scores = vec![
            score_durations("A", &durations(9, 1, 0, 0), &thresholds),
            score_durations("B", &durations(5, 5, 0, 0), &thresholds),
            score_durations("C", &durations(1, 0, 9, 0), &thresholds),
        ];

        let summary = summarize_fleet(&scores);
        assert_eq!(summary.assets, 3);
        assert!((summary.average_utilization_pct - 50.0).abs() < 1e-9);
        assert!((summary.average_maintenance_pct - 20.0).abs() < 1e-9);
        assert_eq!(summary.by_class.excellent, 1);
        assert_eq!(summary.by_class.warning, 1);
        assert_eq!(summary.by_class.critical, 1);
    }

    #[test]
    fn test_summarize_empty_fleet() {
        let summary = summarize_fleet(&[]);
        assert_eq!(summary.assets, 0);
        assert_eq!(summary.average_utilization_pct, 0.0);
    }
}
