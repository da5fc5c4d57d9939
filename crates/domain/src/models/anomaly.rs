//! Anomaly and conformity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a rule in the anomaly battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    StaleCase,
    CostOutlier,
    InvalidOdometer,
    ExcessiveRework,
    MissingCancellationReason,
    SupplierReworkRate,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::StaleCase => "stale_case",
            RuleId::CostOutlier => "cost_outlier",
            RuleId::InvalidOdometer => "invalid_odometer",
            RuleId::ExcessiveRework => "excessive_rework",
            RuleId::MissingCancellationReason => "missing_cancellation_reason",
            RuleId::SupplierReworkRate => "supplier_rework_rate",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stale_case" => Ok(RuleId::StaleCase),
            "cost_outlier" => Ok(RuleId::CostOutlier),
            "invalid_odometer" => Ok(RuleId::InvalidOdometer),
            "excessive_rework" => Ok(RuleId::ExcessiveRework),
            "missing_cancellation_reason" => Ok(RuleId::MissingCancellationReason),
            "supplier_rework_rate" => Ok(RuleId::SupplierReworkRate),
            _ => Err(format!("Invalid rule id: {}", s)),
        }
    }
}

/// Severity of a flagged anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What an anomaly is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AnomalySubject {
    Case(String),
    Supplier(String),
}

impl AnomalySubject {
    pub fn id(&self) -> &str {
        match self {
            AnomalySubject::Case(id) | AnomalySubject::Supplier(id) => id,
        }
    }

    pub fn case_id(&self) -> Option<&str> {
        match self {
            AnomalySubject::Case(id) => Some(id),
            AnomalySubject::Supplier(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnomalySubject::Case(_) => "case",
            AnomalySubject::Supplier(_) => "supplier",
        }
    }
}

/// Rule-specific evidence carried with an anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyDetail {
    StaleCase {
        age_days: i64,
        last_movement_at: DateTime<Utc>,
    },
    CostOutlier {
        cost: f64,
        mean_cost: f64,
        ratio_to_mean: f64,
    },
    InvalidOdometer {
        odometer_in: f64,
        odometer_out: f64,
    },
    ExcessiveRework {
        rework_count: usize,
    },
    MissingCancellationReason,
    SupplierReworkRate {
        rate_pct: f64,
        cases_with_rework: usize,
        total_cases: usize,
    },
}

impl AnomalyDetail {
    /// One-line human readable summary for tables and exports.
    pub fn describe(&self) -> String {
        match self {
            AnomalyDetail::StaleCase { age_days, .. } => {
                format!("No movement for {} days", age_days)
            }
            AnomalyDetail::CostOutlier { cost, ratio_to_mean, .. } => {
                format!("Cost {:.2} is {:.1}x the fleet mean", cost, ratio_to_mean)
            }
            AnomalyDetail::InvalidOdometer {
                odometer_in,
                odometer_out,
            } => format!(
                "Odometer in {:.0} exceeds odometer out {:.0}",
                odometer_in, odometer_out
            ),
            AnomalyDetail::ExcessiveRework { rework_count } => {
                format!("{} rework transitions", rework_count)
            }
            AnomalyDetail::MissingCancellationReason => {
                "Cancelled without a reason".to_string()
            }
            AnomalyDetail::SupplierReworkRate {
                rate_pct,
                cases_with_rework,
                total_cases,
            } => format!(
                "Rework on {} of {} cases ({:.1}%)",
                cases_with_rework, total_cases, rate_pct
            ),
        }
    }
}

/// A flagged anomaly handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnomalyRecord {
    pub subject: AnomalySubject,
    pub rule: RuleId,
    pub severity: Severity,
    pub detected_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    pub detail: AnomalyDetail,
}

/// Result of running the anomaly battery over a case set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConformityReport {
    pub total_cases: usize,
    /// Distinct cases with at least one case-level anomaly.
    pub flagged_cases: usize,
    pub conformity_pct: f64,
    pub anomalies: Vec<AnomalyRecord>,
    /// Records each rule could not evaluate because a required field was missing.
    pub skipped_by_rule: BTreeMap<RuleId, usize>,
}

impl ConformityReport {
    pub fn count_for(&self, rule: RuleId) -> usize {
        self.anomalies.iter().filter(|a| a.rule == rule).count()
    }

    pub fn skipped_for(&self, rule: RuleId) -> usize {
        self.skipped_by_rule.get(&rule).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rule_id_round_trip_strings() {
        for rule in [
            RuleId::StaleCase,
            RuleId::CostOutlier,
            RuleId::InvalidOdometer,
            RuleId::ExcessiveRework,
            RuleId::MissingCancellationReason,
            RuleId::SupplierReworkRate,
        ] {
            assert_eq!(rule.as_str().parse::<RuleId>().unwrap(), rule);
        }
        assert!("unknown_rule".parse::<RuleId>().is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_subject_accessors() {
        let case = AnomalySubject::Case("OS-1".to_string());
        let supplier = AnomalySubject::Supplier("Auto Center".to_string());
        assert_eq!(case.case_id(), Some("OS-1"));
        assert_eq!(supplier.case_id(), None);
        assert_eq!(supplier.id(), "Auto Center");
        assert_eq!(supplier.kind(), "supplier");
    }

    #[test]
    fn test_record_serialization_shape() {
        let record = AnomalyRecord {
            subject: AnomalySubject::Case("OS-1".to_string()),
            rule: RuleId::ExcessiveRework,
            severity: Severity::Medium,
            detected_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            asset_id: None,
            detail: AnomalyDetail::ExcessiveRework { rework_count: 3 },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["subject"]["kind"], "case");
        assert_eq!(json["subject"]["id"], "OS-1");
        assert_eq!(json["rule"], "excessive_rework");
        assert_eq!(json["detail"]["type"], "excessive_rework");
        assert_eq!(json["detail"]["rework_count"], 3);
        assert!(json.get("asset_id").is_none());
    }

    #[test]
    fn test_describe() {
        let detail = AnomalyDetail::SupplierReworkRate {
            rate_pct: 25.0,
            cases_with_rework: 1,
            total_cases: 4,
        };
        assert_eq!(detail.describe(), "Rework on 1 of 4 cases (25.0%)");
        assert_eq!(
            AnomalyDetail::StaleCase {
                age_days: 8,
                last_movement_at: Utc::now()
            }
            .describe(),
            "No movement for 8 days"
        );
    }
}
