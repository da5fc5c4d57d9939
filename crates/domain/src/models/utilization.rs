//! Time-in-state and utilization models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::time::SECONDS_PER_DAY;
use std::fmt;

use super::status::StateCategory;

const MILLIS_PER_DAY: f64 = (SECONDS_PER_DAY * 1_000) as f64;

// ============================================================================
// Decomposition
// ============================================================================

/// A contiguous stretch of asset time attributed to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StateInterval {
    pub asset_id: String,
    pub category: StateCategory,
    pub start: DateTime<Utc>,
    /// `None` while the interval is still open (runs until now).
    pub end: Option<DateTime<Utc>>,
}

impl StateInterval {
    /// Duration in milliseconds, measuring open intervals up to `horizon`.
    pub fn duration_ms(&self, horizon: DateTime<Utc>) -> i64 {
        let end = self.end.unwrap_or(horizon);
        (end - self.start).num_milliseconds().max(0)
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// Accumulated time per category, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StateDurations {
    pub rented_ms: i64,
    pub maintenance_ms: i64,
    pub idle_ms: i64,
    pub unknown_ms: i64,
}

impl StateDurations {
    pub fn add(&mut self, category: StateCategory, millis: i64) {
        let slot = match category {
            StateCategory::Rented => &mut self.rented_ms,
            StateCategory::Maintenance => &mut self.maintenance_ms,
            StateCategory::Idle => &mut self.idle_ms,
            StateCategory::Unknown => &mut self.unknown_ms,
        };
        *slot += millis;
    }

    pub fn get(&self, category: StateCategory) -> i64 {
        match category {
            StateCategory::Rented => self.rented_ms,
            StateCategory::Maintenance => self.maintenance_ms,
            StateCategory::Idle => self.idle_ms,
            StateCategory::Unknown => self.unknown_ms,
        }
    }

    pub fn total_ms(&self) -> i64 {
        self.rented_ms + self.maintenance_ms + self.idle_ms + self.unknown_ms
    }

    pub fn days(&self, category: StateCategory) -> f64 {
        millis_to_days(self.get(category))
    }

    pub fn total_days(&self) -> f64 {
        millis_to_days(self.total_ms())
    }
}

fn millis_to_days(millis: i64) -> f64 {
    millis as f64 / MILLIS_PER_DAY
}

/// Time-in-state breakdown for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Decomposition {
    pub asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub first_event: Option<DateTime<Utc>>,
    /// End of the observation window: decommission time, or now.
    pub horizon: DateTime<Utc>,
    pub decommissioned: bool,
    pub intervals: Vec<StateInterval>,
    pub durations: StateDurations,
    /// Intervals whose negative duration was clamped to zero.
    pub clamped_intervals: usize,
}

impl Decomposition {
    pub fn empty(asset_id: impl Into<String>, horizon: DateTime<Utc>, decommissioned: bool) -> Self {
        Self {
            asset_id: asset_id.into(),
            label: None,
            first_event: None,
            horizon,
            decommissioned,
            intervals: Vec::new(),
            durations: StateDurations::default(),
            clamped_intervals: 0,
        }
    }

    /// Assets without events are excluded from utilization views.
    pub fn has_events(&self) -> bool {
        self.first_event.is_some()
    }

    /// Observation span `horizon - first_event`, never negative.
    pub fn span_ms(&self) -> i64 {
        self.first_event
            .map(|first| (self.horizon - first).num_milliseconds().max(0))
            .unwrap_or(0)
    }

    /// Whether any interval was explicitly labelled idle.
    pub fn has_idle_intervals(&self) -> bool {
        self.intervals
            .iter()
            .any(|i| i.category == StateCategory::Idle)
    }
}

// ============================================================================
// Utilization
// ============================================================================

/// Qualitative utilization bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationClass {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl UtilizationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            UtilizationClass::Excellent => "excellent",
            UtilizationClass::Good => "good",
            UtilizationClass::Warning => "warning",
            UtilizationClass::Critical => "critical",
        }
    }
}

impl fmt::Display for UtilizationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flat utilization row per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UtilizationScore {
    pub asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub total_days: f64,
    pub rented_days: f64,
    pub maintenance_days: f64,
    /// Display remainder: total minus rented and maintenance.
    pub idle_days: f64,
    /// Idle time measured from explicit idle events, when any exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_idle_days: Option<f64>,
    pub utilization_pct: f64,
    pub maintenance_pct: f64,
    /// Ranking score; higher is better.
    pub score: f64,
    pub classification: UtilizationClass,
}

/// Asset counts per utilization class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassBreakdown {
    pub excellent: usize,
    pub good: usize,
    pub warning: usize,
    pub critical: usize,
}

impl ClassBreakdown {
    pub fn record(&mut self, class: UtilizationClass) {
        match class {
            UtilizationClass::Excellent => self.excellent += 1,
            UtilizationClass::Good => self.good += 1,
            UtilizationClass::Warning => self.warning += 1,
            UtilizationClass::Critical => self.critical += 1,
        }
    }
}

/// Fleet-wide utilization summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FleetUtilizationSummary {
    pub assets: usize,
    pub average_utilization_pct: f64,
    pub average_maintenance_pct: f64,
    pub by_class: ClassBreakdown,
}
