//! Scalar field values and row records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// One scalar cell of a row record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Empty,
}

impl FieldValue {
    /// Renders the value the way it is written to a CSV cell.
    ///
    /// Timestamps use RFC 3339 with microseconds and an explicit `+00:00`
    /// offset; `Empty` renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Micros, false),
            FieldValue::Empty => String::new(),
        }
    }

    /// Text content, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map_or(FieldValue::Empty, FieldValue::Float),
            },
            Value::Bool(true) => FieldValue::Text("True".to_string()),
            Value::Bool(false) => FieldValue::Text("False".to_string()),
            Value::Null => FieldValue::Empty,
            // Non-scalars are kept as their JSON text
            other => FieldValue::Text(other.to_string()),
        }
    }
}

/// One flat row: field name to scalar value.
///
/// Field order inside the record does not matter; the exporter writes cells
/// in the declared column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` and returns the record, for building rows inline.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name`, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Cells for `columns` in order; a missing field yields an empty cell.
    pub fn cells<'a>(&'a self, columns: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
        columns
            .iter()
            .map(|column| self.get(column).map(FieldValue::render).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_timestamp_renders_with_micros_and_offset() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(
            FieldValue::from(ts).render(),
            "2025-03-04T05:06:07.123456+00:00"
        );
    }

    #[test]
    fn test_json_scalars_convert() {
        assert_eq!(FieldValue::from(&json!("a")), FieldValue::Text("a".into()));
        assert_eq!(FieldValue::from(&json!(12)), FieldValue::Integer(12));
        assert_eq!(FieldValue::from(&json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from(&json!(true)).render(), "True");
        assert_eq!(FieldValue::from(&json!(false)).render(), "False");
        assert_eq!(FieldValue::from(&json!(null)), FieldValue::Empty);
    }

    #[test]
    fn test_cells_follow_column_order_and_blank_missing() {
        let record = Record::new()
            .with("b", "second")
            .with("a", 1_i64)
            .with("extra", "ignored");
        let cells: Vec<String> = record.cells(&["a", "b", "c"]).collect();
        assert_eq!(cells, vec!["1", "second", ""]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut record = Record::new().with("price", "N/A");
        record.insert("price", "$1.00");
        assert_eq!(record.get("price").and_then(FieldValue::as_text), Some("$1.00"));
        assert_eq!(record.len(), 1);
    }
}
