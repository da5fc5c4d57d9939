//! Numeric coercion for values exported by spreadsheets and ERP systems.
//!
//! Monetary and odometer fields arrive either as JSON numbers or as text such
//! as `"R$ 1.234,56"`, `"$1,234.56"` or `"12 500 km"`. Coercion never fails:
//! anything that cannot be read as a number becomes `0.0`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.,\-]").unwrap();
}

/// A numeric field as supplied by the ETL layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    /// Coerced value; non-finite numbers and unparsable text yield `0.0`.
    pub fn value(&self) -> f64 {
        match self {
            NumericValue::Number(n) if n.is_finite() => *n,
            NumericValue::Number(_) => 0.0,
            NumericValue::Text(s) => coerce_number(s),
        }
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Number(value)
    }
}

impl From<&str> for NumericValue {
    fn from(value: &str) -> Self {
        NumericValue::Text(value.to_string())
    }
}

/// Coerces a loosely formatted number.
///
/// Currency symbols, unit suffixes and whitespace are stripped. When both `.`
/// and `,` appear, the rightmost one is the decimal separator. A repeated
/// separator is grouping. A single separator followed by exactly three digits
/// after a non-zero integer part is grouping (`"R$ 1.500"`, `"50.200 km"`);
/// otherwise it is decimal.
/// Accounting negatives (`"(120,00)"`) are honoured.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let parenthesized = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned = NON_NUMERIC.replace_all(trimmed, "");

    let negative = cleaned.starts_with('-') || parenthesized;
    let body = cleaned.trim_start_matches('-');
    if body.contains('-') {
        return 0.0;
    }

    let normalized = normalize_separators(body);
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if negative {
                -v
            } else {
                v
            }
        }
        _ => 0.0,
    }
}

fn normalize_separators(s: &str) -> String {
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();

    match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(_)) if commas == 1 && !is_grouping(s, ',') => s.replace(',', "."),
        (None, Some(_)) => s.replace(',', ""),
        (Some(_), None) if dots > 1 || is_grouping(s, '.') => s.replace('.', ""),
        _ => s.to_string(),
    }
}

fn is_grouping(s: &str, separator: char) -> bool {
    match s.split_once(separator) {
        Some((int, frac)) => {
            frac.len() == 3
                && frac.chars().all(|c| c.is_ascii_digit())
                && int.chars().any(|c| matches!(c, '1'..='9'))
        }
        None => false,
    }
}

/// Ratio as a percentage, defined as `0` when the denominator is `0`.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let pct = numerator / denominator * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}
