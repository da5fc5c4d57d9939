//! Run metrics.
//!
//! Counters and gauges go through the `metrics` facade; installing a recorder
//! is left to the embedding process. Without one every call is a no-op.
//!
//! Records the following metrics:
//! - `fleet_lifecycle_events_excluded_total`: events dropped by normalization
//! - `fleet_anomaly_rule_skipped_total`: counter with label (rule)
//! - `fleet_anomalies_total`: counter with labels (rule, severity)
//! - `fleet_churn_records_excluded_total`: contract events dropped by the aggregator
//! - `fleet_conformity_pct`: gauge
//! - `fleet_report_duration_seconds`: histogram

use domain::models::ConformityReport;
use metrics::{counter, gauge, histogram};

pub fn record_excluded_events(count: usize) {
    counter!("fleet_lifecycle_events_excluded_total").increment(count as u64);
}

pub fn record_conformity(report: &ConformityReport) {
    for (rule, skipped) in &report.skipped_by_rule {
        counter!("fleet_anomaly_rule_skipped_total", "rule" => rule.as_str())
            .increment(*skipped as u64);
    }

    for anomaly in &report.anomalies {
        counter!(
            "fleet_anomalies_total",
            "rule" => anomaly.rule.as_str(),
            "severity" => anomaly.severity.as_str()
        )
        .increment(1);
    }

    gauge!("fleet_conformity_pct").set(report.conformity_pct);
}

pub fn record_churn_excluded(count: usize) {
    counter!("fleet_churn_records_excluded_total").increment(count as u64);
}

pub fn record_run_duration(seconds: f64) {
    histogram!("fleet_report_duration_seconds").record(seconds);
}
