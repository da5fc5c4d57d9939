//! Analytics services.
//!
//! All services are pure functions or immutable values over in-memory record
//! slices. `now` is always passed in.

pub mod anomaly_detection;
pub mod cache;
pub mod decomposer;
pub mod filter;
pub mod normalizer;
pub mod period_aggregation;
pub mod utilization;

pub use anomaly_detection::{
    AnomalyDetector, AnomalyRule, CostOutlierRule, ExcessiveReworkRule, InvalidOdometerRule,
    MissingCancellationReasonRule, RuleContext, RuleOutcome, StaleCaseRule,
    SupplierReworkRateRule,
};
pub use cache::ResultCache;
pub use decomposer::{decompose, decompose_fleet};
pub use filter::{filter_records, FieldRecord, FilterContext};
pub use normalizer::{normalize_events, NormalizedEvents};
pub use period_aggregation::PeriodAggregator;
pub use utilization::{classify, rank_by_score, score, score_durations, score_fleet, summarize_fleet};
