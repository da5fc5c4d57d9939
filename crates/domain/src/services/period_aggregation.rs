//! Calendar-month aggregation of start/end flows (contract churn).

use chrono::NaiveDate;
use shared::numeric::coerce_number;
use shared::period::PeriodKey;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::DomainError;
use crate::models::{FlowEvent, PeriodAggregation, PeriodBucket};
use crate::services::filter::{FieldRecord, FilterContext};

type DateAccessor<R> = Box<dyn Fn(&R) -> Option<NaiveDate> + Send + Sync>;
type EventAccessor<R> = Box<dyn Fn(&R) -> Option<FlowEvent> + Send + Sync>;
type ValueAccessor<R> = Box<dyn Fn(&R) -> Option<f64> + Send + Sync>;

/// Buckets records by `YYYY-MM` using caller-supplied accessors.
///
/// The aggregator holds no per-call state; every call to [`aggregate`]
/// receives its own filter context.
///
/// [`aggregate`]: PeriodAggregator::aggregate
pub struct PeriodAggregator<R> {
    date_of: DateAccessor<R>,
    event_of: EventAccessor<R>,
    value_of: Option<ValueAccessor<R>>,
    calendar: Option<(PeriodKey, PeriodKey)>,
}

impl<R: 'static> PeriodAggregator<R> {
    pub fn new(
        date_of: impl Fn(&R) -> Option<NaiveDate> + Send + Sync + 'static,
        event_of: impl Fn(&R) -> Option<FlowEvent> + Send + Sync + 'static,
    ) -> Self {
        Self {
            date_of: Box::new(date_of),
            event_of: Box::new(event_of),
            value_of: None,
            calendar: None,
        }
    }

    /// Adds a monetary accessor summed into each bucket.
    pub fn with_value(mut self, value_of: impl Fn(&R) -> Option<f64> + Send + Sync + 'static) -> Self {
        self.value_of = Some(Box::new(value_of));
        self
    }

    /// Emits every month in `from..=to`, zero-filled, and excludes records outside it.
    pub fn with_calendar_range(mut self, from: PeriodKey, to: PeriodKey) -> Result<Self, DomainError> {
        if from > to {
            return Err(DomainError::InvalidPeriodRange { from, to });
        }
        self.calendar = Some((from, to));
        Ok(self)
    }

    pub fn calendar_range(&self) -> Option<(PeriodKey, PeriodKey)> {
        self.calendar
    }
}

impl<R: FieldRecord + 'static> PeriodAggregator<R> {
    /// Aggregator reading the date and event type from named fields.
    pub fn for_fields(date_field: &str, event_field: &str) -> Self {
        let date_field = date_field.to_string();
        let event_field = event_field.to_string();
        Self::new(
            move |r: &R| r.date_field(&date_field),
            move |r: &R| {
                r.field(&event_field)
                    .and_then(|label| FlowEvent::from_label(&label))
            },
        )
    }

    /// Sums the coerced numeric value of `field`; blank values contribute nothing.
    pub fn with_value_field(self, field: &str) -> Self {
        let field = field.to_string();
        self.with_value(move |r: &R| {
            r.field(&field)
                .filter(|v| !v.trim().is_empty())
                .map(|v| coerce_number(&v))
        })
    }
}

impl<R: FieldRecord> PeriodAggregator<R> {
    pub fn aggregate(&self, records: &[R], ctx: &FilterContext) -> PeriodAggregation {
        let mut buckets: BTreeMap<PeriodKey, PeriodBucket> = BTreeMap::new();
        if let Some((from, to)) = self.calendar {
            for period in PeriodKey::range_inclusive(from, to) {
                buckets.insert(period, PeriodBucket::empty(period));
            }
        }

        let mut included = 0;
        let mut excluded = 0;

        for record in records {
            let Some(date) = (self.date_of)(record) else {
                excluded += 1;
                continue;
            };
            if !ctx.matches(record, Some(date)) {
                excluded += 1;
                continue;
            }

            let period = PeriodKey::from_date(date);
            if let Some((from, to)) = self.calendar {
                if period < from || period > to {
                    excluded += 1;
                    continue;
                }
            }

            let value = self.value_of.as_ref().and_then(|value_of| value_of(record));
            buckets
                .entry(period)
                .or_insert_with(|| PeriodBucket::empty(period))
                .record((self.event_of)(record), value);
            included += 1;
        }

        let buckets: Vec<PeriodBucket> = buckets
            .into_values()
            .map(|mut bucket| {
                bucket.finalize();
                bucket
            })
            .collect();

        debug!(
            periods = buckets.len(),
            included,
            excluded,
            "Aggregated records by period"
        );

        PeriodAggregation {
            buckets,
            included,
            excluded,
        }
    }
}
