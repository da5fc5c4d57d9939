//! Maintenance case (service order) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::numeric::NumericValue;
use shared::text::{is_blank, resolve_alias};
use shared::time::parse_timestamp;
use std::fmt;

// ============================================================================
// Case Status
// ============================================================================

/// Workflow status of a case, classified from its raw label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Closed,
    Cancelled,
    Unknown,
}

const CASE_STATUS_ALIASES: &[(&str, CaseStatus)] = &[
    ("open", CaseStatus::Open),
    ("opened", CaseStatus::Open),
    ("in progress", CaseStatus::Open),
    ("pending", CaseStatus::Open),
    ("waiting", CaseStatus::Open),
    ("aberto", CaseStatus::Open),
    ("aberta", CaseStatus::Open),
    ("em andamento", CaseStatus::Open),
    ("em execucao", CaseStatus::Open),
    ("pendente", CaseStatus::Open),
    ("aguardando", CaseStatus::Open),
    ("closed", CaseStatus::Closed),
    ("completed", CaseStatus::Closed),
    ("done", CaseStatus::Closed),
    ("resolved", CaseStatus::Closed),
    ("fechado", CaseStatus::Closed),
    ("finalizado", CaseStatus::Closed),
    ("concluido", CaseStatus::Closed),
    ("encerrado", CaseStatus::Closed),
    ("cancelled", CaseStatus::Cancelled),
    ("canceled", CaseStatus::Cancelled),
    ("cancelado", CaseStatus::Cancelled),
    ("cancelada", CaseStatus::Cancelled),
];

impl CaseStatus {
    /// Classifies a raw label; unrecognised text maps to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        resolve_alias(CASE_STATUS_ALIASES, label, |status| status.precedence())
            .unwrap_or(CaseStatus::Unknown)
    }

    /// Terminal states win over open ones in compound labels.
    fn precedence(&self) -> u8 {
        match self {
            CaseStatus::Cancelled => 3,
            CaseStatus::Closed => 2,
            CaseStatus::Open => 1,
            CaseStatus::Unknown => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::Closed => "closed",
            CaseStatus::Cancelled => "cancelled",
            CaseStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A recorded movement of a case through its workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StageTransition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
    #[serde(default)]
    pub is_rework: bool,
}

impl StageTransition {
    pub fn rework(stage: &str) -> Self {
        Self {
            stage: Some(stage.to_string()),
            at: None,
            is_rework: true,
        }
    }

    pub fn forward(stage: &str) -> Self {
        Self {
            stage: Some(stage.to_string()),
            at: None,
            is_rework: false,
        }
    }
}

/// A maintenance/service order tied to one asset.
///
/// Every field except the identifier may be missing; each anomaly rule checks
/// only the fields it needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CaseRecord {
    pub case_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_movement_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer_in: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer_out: Option<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub stage_transitions: Vec<StageTransition>,
}

impl CaseRecord {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            ..Default::default()
        }
    }

    /// Classified status, `None` when the status field is missing or blank.
    pub fn case_status(&self) -> Option<CaseStatus> {
        if is_blank(self.status.as_deref()) {
            return None;
        }
        self.status.as_deref().map(CaseStatus::from_label)
    }

    pub fn last_movement_time(&self) -> Option<DateTime<Utc>> {
        self.last_movement_at.as_deref().and_then(parse_timestamp)
    }

    /// Coerced cost, `None` when the field is absent.
    pub fn cost_value(&self) -> Option<f64> {
        self.cost.as_ref().map(NumericValue::value)
    }

    /// Coerced odometer readings, `None` unless both are present.
    pub fn odometer_readings(&self) -> Option<(f64, f64)> {
        match (&self.odometer_in, &self.odometer_out) {
            (Some(odo_in), Some(odo_out)) => Some((odo_in.value(), odo_out.value())),
            _ => None,
        }
    }

    /// Supplier identifier, `None` when missing or blank.
    pub fn supplier_id(&self) -> Option<&str> {
        self.supplier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn rework_count(&self) -> usize {
        self.stage_transitions.iter().filter(|t| t.is_rework).count()
    }

    pub fn has_cancellation_reason(&self) -> bool {
        !is_blank(self.cancellation_reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_case_status_from_label() {
        assert_eq!(CaseStatus::from_label("Open"), CaseStatus::Open);
        assert_eq!(CaseStatus::from_label("Em andamento"), CaseStatus::Open);
        assert_eq!(CaseStatus::from_label("Concluído"), CaseStatus::Closed);
        assert_eq!(CaseStatus::from_label("CANCELADO"), CaseStatus::Cancelled);
        assert_eq!(CaseStatus::from_label("archived?"), CaseStatus::Unknown);
    }

    #[test]
    fn test_case_status_compound_prefers_terminal() {
        assert_eq!(
            CaseStatus::from_label("Aberto - cancelado pelo cliente"),
            CaseStatus::Cancelled
        );
    }

    #[test]
    fn test_case_status_missing() {
        let mut case = CaseRecord::new("OS-1");
        assert_eq!(case.case_status(), None);

        case.status = Some("  ".to_string());
        assert_eq!(case.case_status(), None);

        case.status = Some("Fechado".to_string());
        assert_eq!(case.case_status(), Some(CaseStatus::Closed));
    }

    #[test]
    fn test_deserialize_mixed_numeric_fields() {
        let json = r#"{
            "case_id": "OS-42",
            "status": "Aberto",
            "cost": "R$ 2.500,00",
            "odometer_in": 45000,
            "odometer_out": "44.900",
            "last_movement_at": "2024-03-01 10:00:00",
            "stage_transitions": [
                {"stage": "diagnostico", "is_rework": false},
                {"stage": "reparo", "is_rework": true}
            ]
        }"#;
        let case: CaseRecord = serde_json::from_str(json).unwrap();

        assert_eq!(case.cost_value(), Some(2500.0));
        assert_eq!(case.odometer_readings(), Some((45000.0, 44900.0)));
        assert_eq!(case.rework_count(), 1);
        assert_eq!(
            case.last_movement_time(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_null_cost_is_absent() {
        let case: CaseRecord = serde_json::from_str(r#"{"case_id": "OS-7", "cost": null}"#).unwrap();
        assert_eq!(case.cost_value(), None);
    }

    #[test]
    fn test_odometer_requires_both_readings() {
        let mut case = CaseRecord::new("OS-9");
        case.odometer_in = Some(NumericValue::Number(1000.0));
        assert_eq!(case.odometer_readings(), None);
    }

    #[test]
    fn test_supplier_and_reason_blank_handling() {
        let mut case = CaseRecord::new("OS-3");
        case.supplier = Some("   ".to_string());
        assert_eq!(case.supplier_id(), None);

        case.supplier = Some(" Oficina Central ".to_string());
        assert_eq!(case.supplier_id(), Some("Oficina Central"));

        assert!(!case.has_cancellation_reason());
        case.cancellation_reason = Some("cliente desistiu".to_string());
        assert!(case.has_cancellation_reason());
    }
}
