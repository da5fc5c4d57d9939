//! Flatten-to-text exports.
//!
//! Comma-delimited files with a header row. Fields containing a comma, a
//! quote or a line break are quoted and inner quotes doubled.

use domain::models::{AnomalyRecord, PeriodBucket, UtilizationScore};
use domain::services::FieldRecord;
use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::ReportError;

/// Quotes a single CSV field when needed.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn push_row<'a>(csv: &mut String, fields: impl IntoIterator<Item = Cow<'a, str>>) {
    let row: Vec<String> = fields
        .into_iter()
        .map(|f| csv_field(&f).into_owned())
        .collect();
    csv.push_str(&row.join(","));
    csv.push('\n');
}

/// Utilization rows in ranking order.
pub fn utilization_csv(scores: &[UtilizationScore]) -> String {
    let mut csv = String::new();
    csv.push_str("asset_id,label,total_days,rented_days,maintenance_days,idle_days,measured_idle_days,utilization_pct,maintenance_pct,score,classification\n");

    for s in scores {
        push_row(
            &mut csv,
            [
                Cow::Borrowed(s.asset_id.as_str()),
                Cow::Borrowed(s.label.as_deref().unwrap_or("")),
                Cow::Owned(format!("{:.2}", s.total_days)),
                Cow::Owned(format!("{:.2}", s.rented_days)),
                Cow::Owned(format!("{:.2}", s.maintenance_days)),
                Cow::Owned(format!("{:.2}", s.idle_days)),
                Cow::Owned(
                    s.measured_idle_days
                        .map(|d| format!("{:.2}", d))
                        .unwrap_or_default(),
                ),
                Cow::Owned(format!("{:.2}", s.utilization_pct)),
                Cow::Owned(format!("{:.2}", s.maintenance_pct)),
                Cow::Owned(format!("{:.2}", s.score)),
                Cow::Borrowed(s.classification.as_str()),
            ],
        );
    }

    csv
}

pub fn anomalies_csv(anomalies: &[AnomalyRecord]) -> String {
    let mut csv = String::new();
    csv.push_str("rule,severity,subject_kind,subject_id,asset_id,detected_at,description\n");

    for a in anomalies {
        push_row(
            &mut csv,
            [
                Cow::Borrowed(a.rule.as_str()),
                Cow::Borrowed(a.severity.as_str()),
                Cow::Borrowed(a.subject.kind()),
                Cow::Borrowed(a.subject.id()),
                Cow::Borrowed(a.asset_id.as_deref().unwrap_or("")),
                Cow::Owned(a.detected_at.to_rfc3339()),
                Cow::Owned(a.detail.describe()),
            ],
        );
    }

    csv
}

pub fn churn_csv(buckets: &[PeriodBucket]) -> String {
    let mut csv = String::new();
    csv.push_str("period,starts,ends,records,net_flow,rate,monetary_sum\n");

    for b in buckets {
        csv.push_str(&format!(
            "{},{},{},{},{},{:.2},{:.2}\n",
            b.period, b.starts, b.ends, b.records, b.net_flow, b.rate, b.monetary_sum
        ));
    }

    csv
}

/// Already-filtered records flattened to the given columns.
pub fn records_csv<R: FieldRecord>(records: &[&R], columns: &[&str]) -> String {
    let mut csv = String::new();
    push_row(&mut csv, columns.iter().map(|c| Cow::Borrowed(*c)));

    for record in records {
        push_row(
            &mut csv,
            columns
                .iter()
                .map(|c| record.field(c).unwrap_or(Cow::Borrowed(""))),
        );
    }

    csv
}

/// Serialize data to pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<String, ReportError> {
    serde_json::to_string_pretty(data).map_err(ReportError::from)
}

/// Write content to a file, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }

    let mut file = fs::File::create(path).map_err(|e| ReportError::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| ReportError::io(path, e))?;
    Ok(())
}
