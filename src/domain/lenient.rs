//! Lenient field deserializers for hand-authored YAML
//!
//! Documents are written by people and agents, so scalar fields tolerate
//! the wrong type: numbers are accepted where strings are expected, `null`
//! means "missing", and values that cannot be interpreted fall back to the
//! field's default instead of rejecting the whole document.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Renders a scalar value as text, `None` for null and non-scalars
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Interprets a value as a non-negative finite number of hours
pub(crate) fn hours_value(value: &Value) -> Option<f64> {
    let hours = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Tagged(tagged) => return hours_value(&tagged.value),
        _ => None,
    }?;

    (hours.is_finite() && hours >= 0.0).then_some(hours)
}

/// String field: scalars become text, anything else becomes empty
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text).unwrap_or_default())
}

/// Optional string field: empty and non-scalar values become `None`
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(scalar_text)
        .filter(|s| !s.trim().is_empty()))
}

/// Hours field: invalid, negative or missing values become `None`
pub fn hours<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(hours_value))
}

/// List of strings: a lone scalar becomes a one-item list, non-scalar items are dropped
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

/// Boolean flag: accepts `true`/`false` and the strings `"true"`/`"yes"`
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
        _ => false,
    })
}

/// Sequence of records: items that fail to deserialize are dropped
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Sequence(items)) => items
            .into_iter()
            .filter_map(|item| serde_yaml::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Nested record: `null` or a value of the wrong shape becomes the default
pub fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| serde_yaml::from_value(value).ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "string")]
        name: String,
        #[serde(deserialize_with = "opt_string")]
        note: Option<String>,
        #[serde(deserialize_with = "hours")]
        hours: Option<f64>,
        #[serde(deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(deserialize_with = "flag")]
        resolved: bool,
        #[serde(deserialize_with = "record")]
        inner: Inner,
    }

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    #[serde(default)]
    struct Inner {
        #[serde(deserialize_with = "string")]
        label: String,
    }

    fn parse(yaml: &str) -> Sample {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn missing_fields_default() {
        let sample = parse("{}");
        assert_eq!(sample.name, "");
        assert_eq!(sample.note, None);
        assert_eq!(sample.hours, None);
        assert!(sample.tags.is_empty());
        assert!(!sample.resolved);
    }

    #[test]
    fn numbers_become_text() {
        let sample = parse("name: 1.2\nnote: 7");
        assert_eq!(sample.name, "1.2");
        assert_eq!(sample.note.as_deref(), Some("7"));
    }

    #[test]
    fn null_and_blank_are_missing() {
        let sample = parse("name: ~\nnote: '  '");
        assert_eq!(sample.name, "");
        assert_eq!(sample.note, None);
    }

    #[test]
    fn hours_accept_numbers_and_numeric_strings() {
        assert_eq!(parse("hours: 3").hours, Some(3.0));
        assert_eq!(parse("hours: 2.5").hours, Some(2.5));
        assert_eq!(parse("hours: '4'").hours, Some(4.0));
    }

    #[test]
    fn invalid_hours_are_none() {
        assert_eq!(parse("hours: N/A").hours, None);
        assert_eq!(parse("hours: -1").hours, None);
        assert_eq!(parse("hours: .nan").hours, None);
        assert_eq!(parse("hours: [1]").hours, None);
    }

    #[test]
    fn string_list_drops_non_scalars() {
        let sample = parse("tags: [a, 2, {x: 1}, ~]");
        assert_eq!(sample.tags, vec!["a", "2"]);

        let sample = parse("tags: solo");
        assert_eq!(sample.tags, vec!["solo"]);
    }

    #[test]
    fn flags() {
        assert!(parse("resolved: true").resolved);
        assert!(parse("resolved: 'yes'").resolved);
        assert!(!parse("resolved: 1").resolved);
    }

    #[test]
    fn malformed_records_default() {
        assert_eq!(parse("inner: {label: x}").inner.label, "x");
        assert_eq!(parse("inner: ~").inner, Inner::default());
        assert_eq!(parse("inner: 42").inner, Inner::default());
        assert_eq!(parse("inner: [a]").inner, Inner::default());
    }
}
