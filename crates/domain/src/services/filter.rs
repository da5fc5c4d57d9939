//! Cross-filter context and named field access.
//!
//! A [`FilterContext`] is an immutable value: each `with_*` call returns a new
//! context, so one selection can be threaded through several aggregations and
//! used as a cache key.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use shared::numeric::NumericValue;
use shared::period::PeriodKey;
use shared::text::labels_match;
use shared::time::parse_date;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::DomainError;
use crate::models::{CaseRecord, OperationalGroup, RawLifecycleEvent, VehicleStatus};

// ============================================================================
// Field access
// ============================================================================

/// Read access to record fields by name.
pub trait FieldRecord {
    /// Textual value of `name`, `None` when absent or null.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Field parsed as a calendar date.
    fn date_field(&self, name: &str) -> Option<NaiveDate> {
        self.field(name).as_deref().and_then(parse_date)
    }
}

impl<T: FieldRecord + ?Sized> FieldRecord for &T {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

fn json_scalar(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl FieldRecord for Map<String, Value> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).and_then(json_scalar)
    }
}

impl FieldRecord for Value {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.as_object().and_then(|obj| obj.field(name))
    }
}

fn numeric_field(value: &Option<NumericValue>) -> Option<Cow<'_, str>> {
    match value.as_ref()? {
        NumericValue::Number(n) => Some(Cow::Owned(n.to_string())),
        NumericValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
    }
}

fn text_field(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

impl FieldRecord for CaseRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "case_id" => Some(Cow::Borrowed(self.case_id.as_str())),
            "asset_id" => text_field(&self.asset_id),
            "opened_at" => text_field(&self.opened_at),
            "last_movement_at" => text_field(&self.last_movement_at),
            "status" => text_field(&self.status),
            "cost" => numeric_field(&self.cost),
            "odometer_in" => numeric_field(&self.odometer_in),
            "odometer_out" => numeric_field(&self.odometer_out),
            "supplier" => text_field(&self.supplier),
            "cancellation_reason" => text_field(&self.cancellation_reason),
            _ => None,
        }
    }
}

impl FieldRecord for RawLifecycleEvent {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "asset_id" => Some(Cow::Borrowed(self.asset_id.as_str())),
            "timestamp" => self.timestamp.as_deref().map(Cow::Borrowed),
            "state_label" => Some(Cow::Borrowed(self.state_label.as_str())),
            _ => None,
        }
    }
}

// ============================================================================
// Filter context
// ============================================================================

/// Immutable set of predicates applied before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterContext {
    date_range: Option<(NaiveDate, NaiveDate)>,
    equals: BTreeMap<String, String>,
    operational_group: Option<(String, OperationalGroup)>,
    period: Option<PeriodKey>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to dates in `from..=to`.
    pub fn with_date_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Self, DomainError> {
        if from > to {
            return Err(DomainError::InvalidDateRange { from, to });
        }
        Ok(Self {
            date_range: Some((from, to)),
            ..self.clone()
        })
    }

    /// Requires `field` to equal `value`, ignoring case, accents and surrounding whitespace.
    pub fn with_equals(&self, field: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.equals
            .insert(field.to_string(), value.trim().to_string());
        next
    }

    /// Requires the status label in `field` to belong to `group`.
    pub fn with_operational_group(&self, field: &str, group: OperationalGroup) -> Self {
        Self {
            operational_group: Some((field.to_string(), group)),
            ..self.clone()
        }
    }

    /// Drill-down to a single calendar month.
    pub fn with_period(&self, period: PeriodKey) -> Self {
        Self {
            period: Some(period),
            ..self.clone()
        }
    }

    /// Drops any categorical or group predicate on `field`.
    pub fn without_field(&self, field: &str) -> Self {
        let mut next = self.clone();
        next.equals.remove(field);
        if next
            .operational_group
            .as_ref()
            .is_some_and(|(f, _)| f == field)
        {
            next.operational_group = None;
        }
        next
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range
    }

    pub fn period(&self) -> Option<PeriodKey> {
        self.period
    }

    pub fn is_empty(&self) -> bool {
        self.date_range.is_none()
            && self.equals.is_empty()
            && self.operational_group.is_none()
            && self.period.is_none()
    }

    /// Evaluates every predicate against a record and its resolved date.
    ///
    /// Date predicates fail when the record has no date.
    pub fn matches<R: FieldRecord + ?Sized>(&self, record: &R, date: Option<NaiveDate>) -> bool {
        if let Some((from, to)) = self.date_range {
            match date {
                Some(d) if d >= from && d <= to => {}
                _ => return false,
            }
        }

        if let Some(period) = self.period {
            if !date.is_some_and(|d| period.contains(d)) {
                return false;
            }
        }

        for (field, expected) in &self.equals {
            match record.field(field) {
                Some(actual) if labels_match(&actual, expected) => {}
                _ => return false,
            }
        }

        if let Some((field, group)) = &self.operational_group {
            let actual = record
                .field(field)
                .map(|label| VehicleStatus::from_label(&label).operational_group());
            if actual != Some(*group) {
                return false;
            }
        }

        true
    }
}

/// Records passing `ctx`, dated by `date_field`, in input order.
pub fn filter_records<'a, R: FieldRecord>(
    records: &'a [R],
    date_field: &str,
    ctx: &FilterContext,
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| ctx.matches(*r, r.date_field(date_field)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_json_field_access() {
        let record = json!({"plate": "ABC1D23", "value": 1500.5, "active": true, "note": null});
        assert_eq!(record.field("plate").as_deref(), Some("ABC1D23"));
        assert_eq!(record.field("value").as_deref(), Some("1500.5"));
        assert_eq!(record.field("active").as_deref(), Some("true"));
        assert_eq!(record.field("note"), None);
        assert_eq!(record.field("missing"), None);
        assert_eq!(json!([1, 2]).field("plate"), None);
    }

    #[test]
    fn test_case_field_access() {
        let mut case = CaseRecord::new("OS-1");
        case.supplier = Some("Oficina A".to_string());
        case.cost = Some(NumericValue::Number(250.0));
        assert_eq!(case.field("case_id").as_deref(), Some("OS-1"));
        assert_eq!(case.field("supplier").as_deref(), Some("Oficina A"));
        assert_eq!(case.field("cost").as_deref(), Some("250"));
        assert_eq!(case.field("status"), None);
    }

    #[test]
    fn test_lifecycle_event_date_field() {
        let event = RawLifecycleEvent::new("ABC1D23", "2024-03-05 10:00:00", "Rented");
        assert_eq!(event.date_field("timestamp"), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_with_methods_return_new_values() {
        let base = FilterContext::new();
        let narrowed = base.with_equals("region", "South");

        assert!(base.is_empty());
        assert!(!narrowed.is_empty());
        assert_ne!(base, narrowed);
    }

    #[test]
    fn test_invalid_date_range() {
        let err = FilterContext::new()
            .with_date_range(date(2024, 2, 1), date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let ctx = FilterContext::new()
            .with_date_range(date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        let record = json!({});

        assert!(ctx.matches(&record, Some(date(2024, 1, 1))));
        assert!(ctx.matches(&record, Some(date(2024, 1, 31))));
        assert!(!ctx.matches(&record, Some(date(2024, 2, 1))));
        assert!(!ctx.matches(&record, None));
    }

    #[test]
    fn test_equals_is_case_and_whitespace_insensitive() {
        let ctx = FilterContext::new().with_equals("region", "  são paulo ");
        assert!(ctx.matches(&json!({"region": "SAO PAULO"}), None));
        assert!(!ctx.matches(&json!({"region": "Rio"}), None));
        assert!(!ctx.matches(&json!({}), None));
    }

    #[test]
    fn test_operational_group_filter() {
        let ctx = FilterContext::new().with_operational_group("status", OperationalGroup::Unavailable);
        assert!(ctx.matches(&json!({"status": "Oficina"}), None));
        assert!(ctx.matches(&json!({"status": "Sinistro"}), None));
        assert!(!ctx.matches(&json!({"status": "Alugado"}), None));
        assert!(!ctx.matches(&json!({}), None));
    }

    #[test]
    fn test_period_drill_down() {
        let ctx = FilterContext::new().with_period("2024-03".parse().unwrap());
        assert!(ctx.matches(&json!({}), Some(date(2024, 3, 31))));
        assert!(!ctx.matches(&json!({}), Some(date(2024, 4, 1))));
        assert!(!ctx.matches(&json!({}), None));
    }

    #[test]
    fn test_without_field() {
        let ctx = FilterContext::new()
            .with_equals("region", "South")
            .with_operational_group("status", OperationalGroup::Operating);

        let cleared = ctx.without_field("region").without_field("status");
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_hash_eq_for_cache_keys() {
        let a = FilterContext::new().with_equals("region", "South").with_period("2024-01".parse().unwrap());
        let b = FilterContext::new().with_period("2024-01".parse().unwrap()).with_equals("region", "South");

        let mut keys = HashSet::new();
        keys.insert(a);
        assert!(keys.contains(&b));
    }

    #[test]
    fn test_filter_records_keeps_order() {
        let records = vec![
            json!({"id": 1, "date": "2024-01-10", "region": "South"}),
            json!({"id": 2, "date": "2024-02-10", "region": "South"}),
            json!({"id": 3, "date": "2024-01-20", "region": "North"}),
            json!({"id": 4, "date": "2024-01-25", "region": "south"}),
        ];
        let ctx = FilterContext::new()
            .with_equals("region", "South")
            .with_period("2024-01".parse().unwrap());

        let ids: Vec<String> = filter_records(&records, "date", &ctx)
            .iter()
            .filter_map(|r| r.field("id").map(|c| c.into_owned()))
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }
}
