//! Field validation and type coercion.
//!
//! Validation is a pure function of (field spec, candidate value). Values are
//! coerced toward the field's schema type first (string to integer for
//! numeric fields, comma-separated string to list for the multi-value
//! field); a value that cannot be coerced fails the constraint check instead
//! of raising.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::schema::{FieldKind, FormFieldSpec};

use super::values::FieldValue;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$")
        .expect("email pattern is valid")
});

/// Which constraint a candidate value failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintViolation {
    #[error("No value was extracted")]
    MissingValue,

    #[error("Expected {expected}, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Must be at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Must be between {min} and {max}, got {actual}")]
    OutOfRange { min: i64, max: i64, actual: i64 },

    #[error("'{given}' is not one of the valid options")]
    NotAnOption { given: String },

    #[error("Not a valid email address")]
    InvalidEmail,

    #[error("Not a valid date in YYYY-MM-DD format")]
    InvalidDate,

    #[error("Must contain between {min} and {max} items, got {actual}")]
    ListSize {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Each item must be between {min} and {max} characters")]
    ListItemLength { min: usize, max: usize },
}

/// Structured detail for a failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub violation: ConstraintViolation,
    /// Allowed values, populated for choice fields.
    pub valid_options: Option<Vec<String>>,
    /// Human-readable constraint summary, populated for the list field.
    pub hint: Option<String>,
    /// A correction the user likely meant, when one is obvious.
    pub suggested_correction: Option<FieldValue>,
}

impl ValidationFailure {
    fn new(violation: ConstraintViolation) -> Self {
        Self {
            violation,
            valid_options: None,
            hint: None,
            suggested_correction: None,
        }
    }
}

/// Outcome of validating one candidate value against one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The coerced value, ready to commit.
    Valid(FieldValue),
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validates a raw extracted value against a field spec.
///
/// Returns the coerced, commit-ready value on success.
pub fn validate(spec: &FormFieldSpec, raw: &Value) -> ValidationOutcome {
    if raw.is_null() {
        return invalid_for(spec, ConstraintViolation::MissingValue);
    }

    match spec.kind {
        FieldKind::Text { min_len, max_len } => validate_text(spec, raw, min_len, max_len),
        FieldKind::EmailAddress => validate_email(spec, raw),
        FieldKind::Integer { min, max } => validate_integer(spec, raw, min, max),
        FieldKind::Choice { options } => validate_choice(spec, raw, options),
        FieldKind::TextList {
            min_items,
            max_items,
            item_min_len,
            item_max_len,
        } => validate_list(spec, raw, min_items, max_items, item_min_len, item_max_len),
        FieldKind::IsoDate => validate_date(spec, raw),
    }
}

fn validate_text(spec: &FormFieldSpec, raw: &Value, min_len: usize, max_len: usize) -> ValidationOutcome {
    let Some(text) = raw.as_str() else {
        return invalid_for(
            spec,
            ConstraintViolation::WrongType {
                expected: "string",
                actual: json_type_name(raw),
            },
        );
    };
    let len = text.chars().count();
    if len < min_len {
        return invalid_for(spec, ConstraintViolation::TooShort { min: min_len, actual: len });
    }
    if len > max_len {
        return invalid_for(spec, ConstraintViolation::TooLong { max: max_len, actual: len });
    }
    ValidationOutcome::Valid(FieldValue::Text(text.to_string()))
}

fn validate_email(spec: &FormFieldSpec, raw: &Value) -> ValidationOutcome {
    let Some(text) = raw.as_str() else {
        return invalid_for(
            spec,
            ConstraintViolation::WrongType {
                expected: "string",
                actual: json_type_name(raw),
            },
        );
    };
    if !EMAIL_PATTERN.is_match(text) {
        return invalid_for(spec, ConstraintViolation::InvalidEmail);
    }
    ValidationOutcome::Valid(FieldValue::Text(text.to_string()))
}

fn validate_integer(spec: &FormFieldSpec, raw: &Value, min: i64, max: i64) -> ValidationOutcome {
    // Numeric fields accept a bare number or a numeric string.
    let number = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(actual) = number else {
        return invalid_for(
            spec,
            ConstraintViolation::WrongType {
                expected: "integer",
                actual: json_type_name(raw),
            },
        );
    };
    if actual < min || actual > max {
        return invalid_for(spec, ConstraintViolation::OutOfRange { min, max, actual });
    }
    ValidationOutcome::Valid(FieldValue::Integer(actual))
}

fn validate_choice(spec: &FormFieldSpec, raw: &Value, options: &'static [&'static str]) -> ValidationOutcome {
    let Some(text) = raw.as_str() else {
        return invalid_for(
            spec,
            ConstraintViolation::WrongType {
                expected: "string",
                actual: json_type_name(raw),
            },
        );
    };
    if options.contains(&text) {
        return ValidationOutcome::Valid(FieldValue::Text(text.to_string()));
    }

    let mut failure = ValidationFailure::new(ConstraintViolation::NotAnOption {
        given: text.to_string(),
    });
    failure.valid_options = Some(options.iter().map(|o| o.to_string()).collect());
    // Case mismatches are common with transcribed speech; suggest the
    // canonical spelling when it is the only difference.
    failure.suggested_correction = options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(text))
        .map(|o| FieldValue::Text(o.to_string()));
    ValidationOutcome::Invalid(failure)
}

fn validate_list(
    spec: &FormFieldSpec,
    raw: &Value,
    min_items: usize,
    max_items: usize,
    item_min_len: usize,
    item_max_len: usize,
) -> ValidationOutcome {
    // A comma-separated string coerces to a list.
    let items: Option<Vec<String>> = match raw {
        Value::Array(values) => values
            .iter()
            .map(|v| v.as_str().map(|s| s.trim().to_string()))
            .collect(),
        Value::String(s) => Some(
            s.split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        ),
        _ => None,
    };
    let Some(items) = items else {
        return invalid_for(
            spec,
            ConstraintViolation::WrongType {
                expected: "list of strings",
                actual: json_type_name(raw),
            },
        );
    };
    if items.len() < min_items || items.len() > max_items {
        return invalid_for(
            spec,
            ConstraintViolation::ListSize {
                min: min_items,
                max: max_items,
                actual: items.len(),
            },
        );
    }
    if items
        .iter()
        .any(|i| i.chars().count() < item_min_len || i.chars().count() > item_max_len)
    {
        return invalid_for(
            spec,
            ConstraintViolation::ListItemLength {
                min: item_min_len,
                max: item_max_len,
            },
        );
    }
    ValidationOutcome::Valid(FieldValue::List(items))
}

fn validate_date(spec: &FormFieldSpec, raw: &Value) -> ValidationOutcome {
    let Some(text) = raw.as_str() else {
        return invalid_for(
            spec,
            ConstraintViolation::WrongType {
                expected: "string",
                actual: json_type_name(raw),
            },
        );
    };
    match chrono::NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
        Ok(date) => ValidationOutcome::Valid(FieldValue::Date(date)),
        Err(_) => invalid_for(spec, ConstraintViolation::InvalidDate),
    }
}

/// Builds a failure enriched with the field's option set or list hint.
fn invalid_for(spec: &FormFieldSpec, violation: ConstraintViolation) -> ValidationOutcome {
    let mut failure = ValidationFailure::new(violation);
    match spec.kind {
        FieldKind::Choice { options } => {
            failure.valid_options = Some(options.iter().map(|o| o.to_string()).collect());
        }
        FieldKind::TextList {
            min_items,
            max_items,
            item_min_len,
            item_max_len,
        } => {
            failure.hint = Some(format!(
                "A list of {}-{} items, each between {}-{} characters",
                min_items, max_items, item_min_len, item_max_len
            ));
        }
        _ => {}
    }
    ValidationOutcome::Invalid(failure)
}
