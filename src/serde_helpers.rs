//! Serde helpers for flexible deserialization.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Epoch values below this magnitude are seconds, at or above it milliseconds.
/// `1e11` seconds is past the year 5000; `1e11` milliseconds is in 1973.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Naive layouts accepted when a string carries no offset; read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Interpret a timestamp sent by a peer.
///
/// Accepts RFC 3339 strings, offset-less ISO 8601 strings (taken as UTC) and
/// Unix epoch numbers in seconds or milliseconds, integral or fractional.
/// Returns `None` for anything else so the caller can keep the raw value.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp_str(text),
        Value::Number(number) => match number.as_i64() {
            Some(whole) => from_epoch(whole),
            None => number.as_f64().and_then(from_epoch_f64),
        },
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.unsigned_abs() < MILLIS_THRESHOLD.unsigned_abs() {
        DateTime::from_timestamp(value, 0)
    } else {
        DateTime::from_timestamp_millis(value)
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "Fractional epochs are rounded to whole milliseconds after a range check"
)]
fn from_epoch_f64(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let scaled = if value.abs() < MILLIS_THRESHOLD as f64 {
        value * 1000.0
    } else {
        value
    };
    let millis = scaled.round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}
