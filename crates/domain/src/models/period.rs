//! Calendar-bucketed flow models (contract starts/ends, churn).

use serde::{Deserialize, Serialize};
use shared::numeric::percentage;
use shared::period::PeriodKey;
use shared::text::resolve_alias;
use std::fmt;

/// Closed set of flow event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEvent {
    Started,
    Ended,
}

const FLOW_EVENT_ALIASES: &[(&str, FlowEvent)] = &[
    ("started", FlowEvent::Started),
    ("start", FlowEvent::Started),
    ("new", FlowEvent::Started),
    ("inicio", FlowEvent::Started),
    ("iniciado", FlowEvent::Started),
    ("novo", FlowEvent::Started),
    ("ativacao", FlowEvent::Started),
    ("ended", FlowEvent::Ended),
    ("end", FlowEvent::Ended),
    ("terminated", FlowEvent::Ended),
    ("churn", FlowEvent::Ended),
    ("fim", FlowEvent::Ended),
    ("encerrado", FlowEvent::Ended),
    ("finalizado", FlowEvent::Ended),
    ("rescindido", FlowEvent::Ended),
];

impl FlowEvent {
    /// Classifies a raw event-type label.
    pub fn from_label(label: &str) -> Option<Self> {
        resolve_alias(FLOW_EVENT_ALIASES, label, |_| 0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowEvent::Started => "started",
            FlowEvent::Ended => "ended",
        }
    }
}

impl fmt::Display for FlowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metrics for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodBucket {
    pub period: PeriodKey,
    pub starts: u64,
    pub ends: u64,
    /// Every record bucketed into the period, whatever its event type.
    pub records: u64,
    pub net_flow: i64,
    /// `ends / (starts + ends) * 100`, `0` when the period has no flow events.
    pub rate: f64,
    pub monetary_sum: f64,
}

impl PeriodBucket {
    pub fn empty(period: PeriodKey) -> Self {
        Self {
            period,
            starts: 0,
            ends: 0,
            records: 0,
            net_flow: 0,
            rate: 0.0,
            monetary_sum: 0.0,
        }
    }

    pub(crate) fn record(&mut self, event: Option<FlowEvent>, value: Option<f64>) {
        self.records += 1;
        match event {
            Some(FlowEvent::Started) => self.starts += 1,
            Some(FlowEvent::Ended) => self.ends += 1,
            None => {}
        }
        if let Some(v) = value {
            self.monetary_sum += v;
        }
    }

    pub(crate) fn finalize(&mut self) {
        self.net_flow = self.starts as i64 - self.ends as i64;
        self.rate = percentage(self.ends as f64, (self.starts + self.ends) as f64);
    }
}

/// Output of the period aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodAggregation {
    /// Strictly ascending by period, no duplicates.
    pub buckets: Vec<PeriodBucket>,
    pub included: usize,
    /// Records dropped for a missing date, a failed filter, or falling outside the calendar range.
    pub excluded: usize,
}

impl PeriodAggregation {
    pub fn bucket(&self, period: PeriodKey) -> Option<&PeriodBucket> {
        self.buckets
            .binary_search_by(|b| b.period.cmp(&period))
            .ok()
            .map(|idx| &self.buckets[idx])
    }

    pub fn total_net_flow(&self) -> i64 {
        self.buckets.iter().map(|b| b.net_flow).sum()
    }
}
