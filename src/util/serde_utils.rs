use serde::Deserialize;
use serde_json::Value;

/// Accepts a JSON number or a numeric string. Fractions are truncated toward
/// zero; null, negatives and anything unparseable collapse to 0.
pub(crate) fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(truncate)).unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| s.parse::<f64>().ok().and_then(truncate)).unwrap_or(0)
        }
        _ => 0,
    })
}

/// Keeps strings as they are and renders numbers as text. Anything else is `None`.
pub(crate) fn string_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn truncate(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f < u64::MAX as f64).then(|| f.trunc() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "u64_from_string_or_number")]
        n: u64,
    }

    #[derive(Deserialize)]
    struct Label {
        #[serde(default, deserialize_with = "string_from_string_or_number")]
        s: Option<String>,
    }

    fn parse(json: &str) -> u64 {
        serde_json::from_str::<Row>(json).unwrap().n
    }

    fn label(json: &str) -> Option<String> {
        serde_json::from_str::<Label>(json).unwrap().s
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(r#"{"n": 1234567}"#), 1234567);
        assert_eq!(parse(r#"{"n": " 42 "}"#), 42);
    }

    #[test]
    fn float_values_are_truncated() {
        assert_eq!(parse(r#"{"n": 1234567.0}"#), 1234567);
        assert_eq!(parse(r#"{"n": 99.9}"#), 99);
        assert_eq!(parse(r#"{"n": "1234567.5"}"#), 1234567);
        assert_eq!(parse(r#"{"n": -0.5}"#), 0);
    }

    #[test]
    fn odd_values_become_zero() {
        assert_eq!(parse(r#"{}"#), 0);
        assert_eq!(parse(r#"{"n": null}"#), 0);
        assert_eq!(parse(r#"{"n": "hot"}"#), 0);
        assert_eq!(parse(r#"{"n": -5}"#), 0);
        assert_eq!(parse(r#"{"n": "NaN"}"#), 0);
        assert_eq!(parse(r#"{"n": [1]}"#), 0);
    }

    #[test]
    fn labels_take_strings_and_numbers() {
        assert_eq!(label(r#"{"s": " 12万 "}"#).as_deref(), Some(" 12万 "));
        assert_eq!(label(r#"{"s": 12345}"#).as_deref(), Some("12345"));
        assert_eq!(label(r#"{"s": 1.5}"#).as_deref(), Some("1.5"));
        assert_eq!(label(r#"{}"#), None);
        assert_eq!(label(r#"{"s": null}"#), None);
        assert_eq!(label(r#"{"s": true}"#), None);
        assert_eq!(label(r#"{"s": {"v": 1}}"#), None);
    }
}
