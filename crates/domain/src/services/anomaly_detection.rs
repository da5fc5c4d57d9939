//! Anomaly & conformity detection over maintenance cases.
//!
//! The battery is a list of independent rules behind the [`AnomalyRule`]
//! trait. Every rule sees the whole case slice with the same `now`, so rules
//! that need fleet-wide statistics (cost mean, supplier rates) compute them in
//! one pass. A rule that cannot evaluate a record for lack of a field skips
//! it and counts the skip; other rules are unaffected.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::models::{
    AnomalyDetail, AnomalyRecord, AnomalySubject, AnomalyThresholds, CaseRecord, CaseStatus,
    ConformityReport, RuleId, Severity,
};

// ============================================================================
// Rule seam
// ============================================================================

/// Evaluation context shared by all rules in one run.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub now: DateTime<Utc>,
}

/// Result of one rule over a case slice.
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    pub anomalies: Vec<AnomalyRecord>,
    /// Records the rule could not evaluate.
    pub skipped: usize,
}

/// A single anomaly rule.
pub trait AnomalyRule: Send + Sync {
    fn id(&self) -> RuleId;

    fn evaluate(&self, cases: &[CaseRecord], ctx: &RuleContext) -> RuleOutcome;
}

fn case_anomaly(
    case: &CaseRecord,
    rule: RuleId,
    severity: Severity,
    ctx: &RuleContext,
    detail: AnomalyDetail,
) -> AnomalyRecord {
    AnomalyRecord {
        subject: AnomalySubject::Case(case.case_id.clone()),
        rule,
        severity,
        detected_at: ctx.now,
        asset_id: case.asset_id.clone(),
        detail,
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Open cases without movement for longer than the window.
#[derive(Debug, Clone)]
pub struct StaleCaseRule {
    pub stale_after_days: i64,
}

impl AnomalyRule for StaleCaseRule {
    fn id(&self) -> RuleId {
        RuleId::StaleCase
    }

    fn evaluate(&self, cases: &[CaseRecord], ctx: &RuleContext) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();
        let Some(window) = Duration::try_days(self.stale_after_days) else {
            warn!(
                stale_after_days = self.stale_after_days,
                "Stale window out of range, rule skipped"
            );
            outcome.skipped = cases.len();
            return outcome;
        };
        let high_window = window.checked_mul(2);

        for case in cases {
            let status = match case.case_status() {
                Some(CaseStatus::Unknown) | None => {
                    outcome.skipped += 1;
                    continue;
                }
                Some(status) => status,
            };
            if status != CaseStatus::Open {
                continue;
            }
            let Some(last_movement) = case.last_movement_time() else {
                outcome.skipped += 1;
                continue;
            };

            let age = ctx.now - last_movement;
            if age <= window {
                continue;
            }

            let severity = if high_window.is_some_and(|high| age > high) {
                Severity::High
            } else {
                Severity::Medium
            };
            outcome.anomalies.push(case_anomaly(
                case,
                self.id(),
                severity,
                ctx,
                AnomalyDetail::StaleCase {
                    age_days: age.num_days(),
                    last_movement_at: last_movement,
                },
            ));
        }

        outcome
    }
}

/// Costs far above the mean of all positive costs.
#[derive(Debug, Clone)]
pub struct CostOutlierRule {
    pub multiplier: f64,
}

impl AnomalyRule for CostOutlierRule {
    fn id(&self) -> RuleId {
        RuleId::CostOutlier
    }

    fn evaluate(&self, cases: &[CaseRecord], ctx: &RuleContext) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();

        let costs: Vec<(&CaseRecord, f64)> = cases
            .iter()
            .filter_map(|case| match case.cost_value() {
                Some(cost) => Some((case, cost)),
                None => {
                    outcome.skipped += 1;
                    None
                }
            })
            .collect();

        let positive: Vec<f64> = costs.iter().map(|(_, c)| *c).filter(|c| *c > 0.0).collect();
        if positive.is_empty() {
            return outcome;
        }
        let mean = positive.iter().sum::<f64>() / positive.len() as f64;
        let threshold = self.multiplier * mean;

        for (case, cost) in costs {
            if cost > 0.0 && cost > threshold {
                outcome.anomalies.push(case_anomaly(
                    case,
                    self.id(),
                    Severity::High,
                    ctx,
                    AnomalyDetail::CostOutlier {
                        cost,
                        mean_cost: mean,
                        ratio_to_mean: cost / mean,
                    },
                ));
            }
        }

        outcome
    }
}

/// Entry odometer reading above the exit reading.
#[derive(Debug, Clone, Default)]
pub struct InvalidOdometerRule;

impl AnomalyRule for InvalidOdometerRule {
    fn id(&self) -> RuleId {
        RuleId::InvalidOdometer
    }

    fn evaluate(&self, cases: &[CaseRecord], ctx: &RuleContext) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();

        for case in cases {
            let Some((odometer_in, odometer_out)) = case.odometer_readings() else {
                outcome.skipped += 1;
                continue;
            };
            if odometer_in > 0.0 && odometer_out > 0.0 && odometer_in > odometer_out {
                outcome.anomalies.push(case_anomaly(
                    case,
                    self.id(),
                    Severity::High,
                    ctx,
                    AnomalyDetail::InvalidOdometer {
                        odometer_in,
                        odometer_out,
                    },
                ));
            }
        }

        outcome
    }
}

#[derive(Debug, Clone)]
pub struct ExcessiveReworkRule {
    pub max_rework_transitions: usize,
}

impl AnomalyRule for ExcessiveReworkRule {
    fn id(&self) -> RuleId {
        RuleId::ExcessiveRework
    }

    fn evaluate(&self, cases: &[CaseRecord], ctx: &RuleContext) -> RuleOutcome {
        let anomalies = cases
            .iter()
            .filter(|case| case.rework_count() > self.max_rework_transitions)
            .map(|case| {
                case_anomaly(
                    case,
                    self.id(),
                    Severity::Medium,
                    ctx,
                    AnomalyDetail::ExcessiveRework {
                        rework_count: case.rework_count(),
                    },
                )
            })
            .collect();

        RuleOutcome {
            anomalies,
            skipped: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MissingCancellationReasonRule;

impl AnomalyRule for MissingCancellationReasonRule {
    fn id(&self) -> RuleId {
        RuleId::MissingCancellationReason
    }

    fn evaluate(&self, cases: &[CaseRecord], ctx: &RuleContext) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();

        for case in cases {
            let status = match case.case_status() {
                Some(CaseStatus::Unknown) | None => {
                    outcome.skipped += 1;
                    continue;
                }
                Some(status) => status,
            };
            if status == CaseStatus::Cancelled && !case.has_cancellation_reason() {
                outcome.anomalies.push(case_anomaly(
                    case,
                    self.id(),
                    Severity::Low,
                    ctx,
                    AnomalyDetail::MissingCancellationReason,
                ));
            }
        }

        outcome
    }
}

/// Suppliers whose share of cases with rework exceeds the limit.
///
/// Emits supplier-level records; they never flag individual cases.
#[derive(Debug, Clone)]
pub struct SupplierReworkRateRule {
    pub max_rate_pct: f64,
}

impl AnomalyRule for SupplierReworkRateRule {
    fn id(&self) -> RuleId {
        RuleId::SupplierReworkRate
    }

    fn evaluate(&self, cases: &[CaseRecord], ctx: &RuleContext) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();
        // supplier -> (total, with rework)
        let mut per_supplier: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

        for case in cases {
            let Some(supplier) = case.supplier_id() else {
                outcome.skipped += 1;
                continue;
            };
            let entry = per_supplier.entry(supplier).or_default();
            entry.0 += 1;
            if case.rework_count() > 0 {
                entry.1 += 1;
            }
        }

        for (supplier, (total_cases, cases_with_rework)) in per_supplier {
            let rate_pct =
                shared::numeric::percentage(cases_with_rework as f64, total_cases as f64);
            if rate_pct > self.max_rate_pct {
                outcome.anomalies.push(AnomalyRecord {
                    subject: AnomalySubject::Supplier(supplier.to_string()),
                    rule: self.id(),
                    severity: Severity::High,
                    detected_at: ctx.now,
                    asset_id: None,
                    detail: AnomalyDetail::SupplierReworkRate {
                        rate_pct,
                        cases_with_rework,
                        total_cases,
                    },
                });
            }
        }

        outcome
    }
}

// ============================================================================
// Detector
// ============================================================================

/// Runs a battery of rules and folds the results into a conformity report.
pub struct AnomalyDetector {
    rules: Vec<Box<dyn AnomalyRule>>,
}

impl AnomalyDetector {
    /// Standard six-rule battery configured from thresholds.
    pub fn new(thresholds: &AnomalyThresholds) -> Self {
        Self::with_rules(vec![
            Box::new(StaleCaseRule {
                stale_after_days: thresholds.stale_after_days,
            }),
            Box::new(CostOutlierRule {
                multiplier: thresholds.cost_outlier_multiplier,
            }),
            Box::new(InvalidOdometerRule),
            Box::new(ExcessiveReworkRule {
                max_rework_transitions: thresholds.max_rework_transitions,
            }),
            Box::new(MissingCancellationReasonRule),
            Box::new(SupplierReworkRateRule {
                max_rate_pct: thresholds.supplier_rework_rate_pct,
            }),
        ])
    }

    pub fn with_rules(rules: Vec<Box<dyn AnomalyRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn evaluate(&self, cases: &[CaseRecord], now: DateTime<Utc>) -> ConformityReport {
        let ctx = RuleContext { now };
        let mut anomalies = Vec::new();
        let mut skipped_by_rule = BTreeMap::new();

        for rule in &self.rules {
            let outcome = rule.evaluate(cases, &ctx);
            debug!(
                rule = %rule.id(),
                flagged = outcome.anomalies.len(),
                skipped = outcome.skipped,
                "Evaluated anomaly rule"
            );
            *skipped_by_rule.entry(rule.id()).or_insert(0) += outcome.skipped;
            anomalies.extend(outcome.anomalies);
        }

        anomalies.sort_by(|a, b| a.rule.cmp(&b.rule).then_with(|| a.subject.cmp(&b.subject)));

        let flagged: BTreeSet<&str> = anomalies
            .iter()
            .filter_map(|a| a.subject.case_id())
            .collect();
        let flagged_cases = flagged.len();
        let total_cases = cases.len();

        let conformity_pct = if total_cases == 0 {
            100.0
        } else {
            shared::numeric::percentage((total_cases - flagged_cases) as f64, total_cases as f64)
                .clamp(0.0, 100.0)
        };

        ConformityReport {
            total_cases,
            flagged_cases,
            conformity_pct,
            anomalies,
            skipped_by_rule,
        }
    }
}
