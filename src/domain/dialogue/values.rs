//! Committed field values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value accepted for a form field, coerced to its schema type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    List(Vec<String>),
}

impl FieldValue {
    /// Renders the value as the natural JSON form for the final output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Integer(n) => serde_json::Value::Number((*n).into()),
            FieldValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|i| serde_json::Value::String(i.clone()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_displays_comma_separated() {
        let value = FieldValue::List(vec!["Web Development".into(), "Machine Learning".into()]);
        assert_eq!(value.to_string(), "Web Development, Machine Learning");
    }

    #[test]
    fn date_displays_iso() {
        let value = FieldValue::Date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(value.to_string(), "2025-06-01");
    }

    #[test]
    fn to_json_uses_natural_forms() {
        assert_eq!(FieldValue::Integer(30).to_json(), serde_json::json!(30));
        assert_eq!(
            FieldValue::List(vec!["Cloud".into()]).to_json(),
            serde_json::json!(["Cloud"])
        );
    }
}
