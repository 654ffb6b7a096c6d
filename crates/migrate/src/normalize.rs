//! Field normalization: raw cell values to typed, nullable domain values.
//!
//! Every function here is total. Legacy catalog data is dirty, so malformed
//! input becomes `None` (or `false` for booleans) instead of an error.

use crate::model::RawValue;

/// Date format written to the destination.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Integer value of a cell. Bracketed text such as `"[1923]"` is accepted;
/// fractional values truncate toward zero.
pub fn to_integer(value: Option<&RawValue>) -> Option<i64> {
    let n = match value? {
        RawValue::Int(n) => return Some(*n),
        RawValue::Float(f) => *f,
        RawValue::Bool(b) => return Some(*b as i64),
        RawValue::Text(s) => {
            let cleaned = s.trim().trim_matches(|c| c == '[' || c == ']').trim();
            cleaned.parse::<f64>().ok()?
        }
        RawValue::Empty | RawValue::Date(_) => return None,
    };
    float_to_integer(n)
}

fn float_to_integer(n: f64) -> Option<i64> {
    if !n.is_finite() {
        return None;
    }
    let truncated = n.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

pub fn to_float(value: Option<&RawValue>) -> Option<f64> {
    let n = match value? {
        RawValue::Int(n) => *n as f64,
        RawValue::Float(f) => *f,
        RawValue::Bool(b) => *b as i64 as f64,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        RawValue::Empty | RawValue::Date(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// True iff the value reads as a nonzero integer. Absent values are false;
/// booleans have no null state.
pub fn to_boolean(value: Option<&RawValue>) -> bool {
    match value {
        Some(RawValue::Bool(b)) => *b,
        Some(RawValue::Int(n)) => *n != 0,
        Some(RawValue::Float(f)) => float_to_integer(*f).is_some_and(|n| n != 0),
        Some(RawValue::Text(s)) => s.trim().parse::<i64>().is_ok_and(|n| n != 0),
        Some(RawValue::Empty) | Some(RawValue::Date(_)) | None => false,
    }
}

/// `YYYY-MM-DD` for values that carry a date. Text that merely looks like a
/// date is not a date here; readers decide what is a date.
pub fn to_date_string(value: Option<&RawValue>) -> Option<String> {
    match value? {
        RawValue::Date(dt) => Some(dt.format(DATE_FORMAT).to_string()),
        _ => None,
    }
}

/// Display form of a value: trimmed text, integral floats without `.0`.
pub fn render(value: Option<&RawValue>) -> Option<String> {
    let s = match value? {
        RawValue::Empty => return None,
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Int(n) => n.to_string(),
        RawValue::Float(f) if !f.is_finite() => return None,
        RawValue::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        RawValue::Bool(b) => b.to_string(),
        RawValue::Date(dt) => dt.format(DATE_FORMAT).to_string(),
    };
    (!s.is_empty()).then_some(s)
}

pub fn to_text(value: Option<&RawValue>) -> Option<String> {
    render(value)
}

/// Text truncated to `max_len` characters.
pub fn to_bounded_text(value: Option<&RawValue>, max_len: usize) -> Option<String> {
    let s = render(value)?;
    let truncated = truncate_chars(&s, max_len).trim_end().to_string();
    (!truncated.is_empty()).then_some(truncated)
}

/// Keep the first identifier of a compound cell (`"978-0-14 / 978-1-85"`),
/// drop hyphens, truncate to `max_len`.
pub fn normalize_identifier(value: Option<&RawValue>, max_len: usize) -> Option<String> {
    let s = render(value)?;
    let first = s
        .split('/')
        .next()
        .unwrap_or("")
        .split_whitespace()
        .next()
        .unwrap_or("");
    let cleaned: String = first.chars().filter(|c| *c != '-').collect();
    let truncated = truncate_chars(&cleaned, max_len);
    (!truncated.is_empty()).then(|| truncated.to_string())
}

/// Length in millimetres. A unit mentioning `cm` scales by 10; anything else
/// is taken to already be millimetres.
pub fn convert_length(value: Option<f64>, unit: Option<&str>) -> Option<f64> {
    let value = value?;
    match unit {
        Some(u) if u.to_lowercase().contains("cm") => Some(value * 10.0),
        _ => Some(value),
    }
}

/// Three-letter currency code.
pub fn to_currency(value: Option<&RawValue>) -> Option<String> {
    to_bounded_text(value, 3).map(|s| s.to_uppercase())
}

fn truncate_chars(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
