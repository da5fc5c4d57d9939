//! Shared fixtures for report integration tests.

use chrono::{DateTime, TimeZone, Utc};
use fleet_report::Config;
use serde_json::{json, Value};
use std::path::Path;

/// Evaluation time used by every scenario.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
}

/// A small fleet snapshot with known answers.
///
/// - `ABC1D23`: rented 15 days, workshop 5 days, still active.
/// - `DEF4G56`: rented 20 days, idle 10 days, decommissioned 2024-05-01.
/// - `GHI7J89`: registered but no events.
/// - Two lifecycle events are unusable.
/// - Cases: one stale, one cancelled without reason, costs `[100, 100, 10000]`.
/// - Contracts: January 5 started / 2 ended, February 1 started, one undated.
pub fn scenario_snapshot() -> Value {
    let mut contracts: Vec<Value> = (1..=5)
        .map(|d| json!({"date": format!("2024-01-{:02}", d), "event": "Started", "monthly_value": "R$ 1.000,00"}))
        .collect();
    contracts.push(json!({"date": "2024-01-20", "event": "Ended", "monthly_value": 0}));
    contracts.push(json!({"date": "2024-01-28", "event": "Encerrado"}));
    contracts.push(json!({"date": "2024-02-03", "event": "Novo", "monthly_value": 1500}));
    contracts.push(json!({"event": "Started"}));

    json!({
        "dataset_version": 7,
        "assets": [
            {"asset_id": "ABC1D23", "label": "Onix 1.0"},
            {"asset_id": "DEF4G56", "label": "Strada", "decommissioned_at": "2024-05-01"},
            {"asset_id": "GHI7J89"}
        ],
        "lifecycle_events": [
            {"asset_id": "ABC1D23", "timestamp": "2024-06-10", "state_label": "Alugado"},
            {"asset_id": "ABC1D23", "timestamp": "2024-05-26", "state_label": "Rented"},
            {"asset_id": "ABC1D23", "timestamp": "2024-06-05", "state_label": "Oficina"},
            {"asset_id": "DEF4G56", "timestamp": "01/04/2024", "state_label": "Locado"},
            {"asset_id": "DEF4G56", "timestamp": "2024-04-21T00:00:00Z", "state_label": "Disponível"},
            {"asset_id": "", "timestamp": "2024-04-21", "state_label": "Rented"},
            {"asset_id": "DEF4G56", "timestamp": "sometime", "state_label": "Rented"}
        ],
        "cases": [
            {"case_id": "OS-1", "asset_id": "ABC1D23", "status": "Aberto", "last_movement_at": "2024-06-07"},
            {"case_id": "OS-2", "asset_id": "ABC1D23", "status": "Open", "last_movement_at": "2024-06-09", "cost": null},
            {"case_id": "OS-3", "status": "Fechado", "cost": 100},
            {"case_id": "OS-4", "status": "Fechado", "cost": "100,00"},
            {"case_id": "OS-5", "status": "Fechado", "cost": 10000},
            {"case_id": "OS-6", "status": "Cancelado", "cancellation_reason": ""}
        ],
        "contract_events": contracts
    })
}

pub fn write_snapshot(dir: &Path) -> String {
    let path = dir.join("snapshot.json");
    std::fs::write(&path, scenario_snapshot().to_string()).unwrap();
    path.to_str().unwrap().to_string()
}

pub fn test_config(snapshot_path: &str, output_dir: &Path, overrides: &[(&str, &str)]) -> Config {
    let output_dir = output_dir.to_str().unwrap();
    let mut all = vec![
        ("input.snapshot_path", snapshot_path),
        ("output.dir", output_dir),
        ("churn.value_field", "monthly_value"),
    ];
    all.extend_from_slice(overrides);

    let config = Config::load_for_test(&all).expect("Failed to load config");
    config.validate().expect("Invalid test config");
    config
}
