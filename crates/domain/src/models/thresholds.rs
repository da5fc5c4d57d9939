//! Business-policy thresholds for the anomaly battery and utilization scoring.
//!
//! Defaults reproduce the fleet team's standing policy; deployments override
//! them through configuration.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Thresholds for the anomaly & conformity rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AnomalyThresholds {
    /// Open cases idle for longer than this are stale.
    #[serde(default = "default_stale_after_days")]
    #[validate(range(min = 1, max = 365))]
    pub stale_after_days: i64,

    /// Costs above `multiplier * mean` are outliers.
    #[serde(default = "default_cost_outlier_multiplier")]
    #[validate(range(min = 1.0, max = 100.0))]
    pub cost_outlier_multiplier: f64,

    /// More rework transitions than this flag the case.
    #[serde(default = "default_max_rework_transitions")]
    #[validate(range(max = 1000))]
    pub max_rework_transitions: usize,

    /// Supplier rework rate (percent) above which the supplier is flagged.
    #[serde(default = "default_supplier_rework_rate_pct")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub supplier_rework_rate_pct: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
            cost_outlier_multiplier: default_cost_outlier_multiplier(),
            max_rework_transitions: default_max_rework_transitions(),
            supplier_rework_rate_pct: default_supplier_rework_rate_pct(),
        }
    }
}

/// Cut-offs for utilization classification (percent of observed time rented).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_utilization_bands"))]
pub struct UtilizationThresholds {
    #[serde(default = "default_excellent_pct")]
    pub excellent_pct: f64,
    #[serde(default = "default_good_pct")]
    pub good_pct: f64,
    #[serde(default = "default_warning_pct")]
    pub warning_pct: f64,
}

impl Default for UtilizationThresholds {
    fn default() -> Self {
        Self {
            excellent_pct: default_excellent_pct(),
            good_pct: default_good_pct(),
            warning_pct: default_warning_pct(),
        }
    }
}

fn validate_utilization_bands(thresholds: &UtilizationThresholds) -> Result<(), ValidationError> {
    shared::validation::validate_descending_bands(
        thresholds.excellent_pct,
        thresholds.good_pct,
        thresholds.warning_pct,
    )
}

// Default value functions
fn default_stale_after_days() -> i64 {
    7
}
fn default_cost_outlier_multiplier() -> f64 {
    3.0
}
fn default_max_rework_transitions() -> usize {
    2
}
fn default_supplier_rework_rate_pct() -> f64 {
    20.0
}
fn default_excellent_pct() -> f64 {
    80.0
}
fn default_good_pct() -> f64 {
    60.0
}
fn default_warning_pct() -> f64 {
    40.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_defaults() {
        let thresholds = AnomalyThresholds::default();
        assert_eq!(thresholds.stale_after_days, 7);
        assert_eq!(thresholds.cost_outlier_multiplier, 3.0);
        assert_eq!(thresholds.max_rework_transitions, 2);
        assert_eq!(thresholds.supplier_rework_rate_pct, 20.0);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn test_anomaly_partial_deserialize_uses_defaults() {
        let thresholds: AnomalyThresholds =
            serde_json::from_str(r#"{"stale_after_days": 14}"#).unwrap();
        assert_eq!(thresholds.stale_after_days, 14);
        assert_eq!(thresholds.cost_outlier_multiplier, 3.0);
    }

    #[test]
    fn test_anomaly_validation() {
        let thresholds = AnomalyThresholds {
            stale_after_days: 0,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());

        let thresholds = AnomalyThresholds {
            supplier_rework_rate_pct: 120.0,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());

        let thresholds = AnomalyThresholds {
            cost_outlier_multiplier: 0.5,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_utilization_defaults() {
        let thresholds = UtilizationThresholds::default();
        assert_eq!(thresholds.excellent_pct, 80.0);
        assert_eq!(thresholds.good_pct, 60.0);
        assert_eq!(thresholds.warning_pct, 40.0);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn test_utilization_bands_must_descend() {
        let thresholds = UtilizationThresholds {
            excellent_pct: 50.0,
            good_pct: 60.0,
            warning_pct: 40.0,
        };
        assert!(thresholds.validate().is_err());
    }
}
