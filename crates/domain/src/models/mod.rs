//! Domain models for fleet lifecycle analytics.

pub mod anomaly;
pub mod case;
pub mod lifecycle_event;
pub mod period;
pub mod status;
pub mod thresholds;
pub mod utilization;

pub use anomaly::{AnomalyDetail, AnomalyRecord, AnomalySubject, ConformityReport, RuleId, Severity};
pub use case::{CaseRecord, CaseStatus, StageTransition};
pub use lifecycle_event::{Asset, LifecycleEvent, RawLifecycleEvent};
pub use period::{FlowEvent, PeriodAggregation, PeriodBucket};
pub use status::{OperationalGroup, StateCategory, VehicleStatus};
pub use thresholds::{AnomalyThresholds, UtilizationThresholds};
pub use utilization::{
    ClassBreakdown, Decomposition, FleetUtilizationSummary, StateDurations, StateInterval,
    UtilizationClass, UtilizationScore,
};
