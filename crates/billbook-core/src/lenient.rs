//! Lenient decoders for stored and imported snapshots.
//!
//! Snapshots come from older app versions and hand-edited backup files, so a
//! single odd field must never reject the whole blob. Every helper here
//! takes whatever JSON value is present and falls back to a neutral value.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Numeric view of any JSON value: numbers as-is, numeric strings parsed,
/// everything else (and non-finite results) is 0.
pub(crate) fn number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Strings stay strings; numbers and booleans are stringified; anything
/// else is empty.
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

pub(crate) fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(number(&Value::deserialize(deserializer)?))
}

/// Stock is a whole number of units, floored at zero.
pub(crate) fn stock<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = number(&Value::deserialize(deserializer)?).trunc();
    Ok(value.clamp(0.0, u32::MAX as f64) as u32)
}

/// `YYYY-MM-DD`, optionally followed by a time part. Anything else is
/// "no date".
pub(crate) fn date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => parse_date(&s),
        _ => None,
    })
}

pub(crate) fn parse_date(input: &str) -> Option<NaiveDate> {
    let head = input.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Decodes with the type's own rules and falls back to its default on any
/// mismatch (unknown enum names, `null`, wrong JSON type).
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Collections: a non-array value decodes as empty, and each element that
/// fails to decode is dropped instead of failing the whole list.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number() {
        assert_eq!(number(&json!(2.5)), 2.5);
        assert_eq!(number(&json!(" 7 ")), 7.0);
        assert_eq!(number(&json!("seven")), 0.0);
        assert_eq!(number(&json!(null)), 0.0);
        assert_eq!(number(&json!("inf")), 0.0);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-05"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(
            parse_date("2024-03-05T10:00:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_date("05/03/2024"), None);
        assert_eq!(parse_date(""), None);
    }
}
