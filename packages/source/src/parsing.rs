//! Field coercion helpers for raw Socrata records.
//!
//! Each helper takes an untyped JSON scalar and either produces a typed
//! value or reports absence. None of them fail: the normalizer decides what
//! an absent value means for the row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Parses a Socrata or ISO 8601 timestamp.
///
/// Accepts `2024-01-15T14:30:00.000`, `2024-01-15T14:30:00`,
/// `2024-01-15 14:30:00`, RFC 3339 with an offset (the wall-clock time is
/// kept), and a bare `2024-01-15` (midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Coerces a timestamp field. Non-string values are absent.
#[must_use]
pub fn coerce_timestamp(value: Option<&Value>) -> Option<NaiveDateTime> {
    value?.as_str().and_then(parse_timestamp)
}

/// Coerces a numeric field from a JSON number or a numeric string.
///
/// Non-finite results are treated as absent.
#[must_use]
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Coerces a boolean flag, defaulting to `false` when the value is missing
/// or not recognizable.
#[must_use]
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "t" | "yes" | "y" | "1"
        ),
        _ => false,
    }
}

/// Coerces a text field. Strings are kept, numbers and booleans are
/// stringified, and null, blank, or structured values are absent.
#[must_use]
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_socrata_date_with_fractional() {
        let dt = parse_timestamp("2024-01-15T14:30:00.000").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_socrata_date_without_fractional() {
        let dt = parse_timestamp("2024-01-15T14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_rfc3339_keeping_wall_clock() {
        let dt = parse_timestamp("2024-01-15T14:30:00-06:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let dt = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 00:00:00");
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(coerce_timestamp(Some(&json!(1_705_329_000))).is_none());
        assert!(coerce_timestamp(None).is_none());
    }

    #[test]
    fn coerces_coordinates() {
        assert_eq!(coerce_f64(Some(&json!("41.8781"))), Some(41.8781));
        assert_eq!(coerce_f64(Some(&json!(-87.6298))), Some(-87.6298));
        assert_eq!(coerce_f64(Some(&json!("abc"))), None);
        assert_eq!(coerce_f64(Some(&json!("NaN"))), None);
        assert_eq!(coerce_f64(Some(&Value::Null)), None);
        assert_eq!(coerce_f64(None), None);
    }

    #[test]
    fn coerces_flags_defaulting_to_false() {
        assert!(coerce_bool(Some(&json!(true))));
        assert!(coerce_bool(Some(&json!("TRUE"))));
        assert!(coerce_bool(Some(&json!("Y"))));
        assert!(coerce_bool(Some(&json!(1))));
        assert!(!coerce_bool(Some(&json!(false))));
        assert!(!coerce_bool(Some(&json!("false"))));
        assert!(!coerce_bool(Some(&json!("maybe"))));
        assert!(!coerce_bool(Some(&json!(0))));
        assert!(!coerce_bool(Some(&Value::Null)));
        assert!(!coerce_bool(None));
    }

    #[test]
    fn coerces_text() {
        assert_eq!(coerce_text(Some(&json!(" THEFT "))), Some("THEFT".to_string()));
        assert_eq!(coerce_text(Some(&json!(25))), Some("25".to_string()));
        assert_eq!(coerce_text(Some(&json!(""))), None);
        assert_eq!(coerce_text(Some(&Value::Null)), None);
        assert_eq!(coerce_text(Some(&json!({"a": 1}))), None);
    }
}
