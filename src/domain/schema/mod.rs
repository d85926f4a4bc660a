//! Form schema: the static declaration of fields, types, and constraints.
//!
//! The schema is fixed at process start. Field ordering defines the
//! field-advance sequence used by the dialogue state machine.

mod field_name;

pub use field_name::{FieldName, UnknownFieldName};

use once_cell::sync::Lazy;

/// Allowed experience levels.
pub const EXPERIENCE_LEVELS: &[&str] = &["Beginner", "Intermediate", "Advanced", "Expert"];

/// Allowed programming languages.
pub const PREFERRED_LANGUAGES: &[&str] =
    &["Python", "JavaScript", "Java", "C++", "Go", "Rust", "Other"];

/// Semantic type of a field, carrying its constraint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text with length bounds.
    Text { min_len: usize, max_len: usize },
    /// Email address matching an RFC-like pattern.
    EmailAddress,
    /// Integer within an inclusive range.
    Integer { min: i64, max: i64 },
    /// One of a fixed set of options.
    Choice { options: &'static [&'static str] },
    /// List of short strings with size and per-item length bounds.
    TextList {
        min_items: usize,
        max_items: usize,
        item_min_len: usize,
        item_max_len: usize,
    },
    /// ISO 8601 calendar date (YYYY-MM-DD).
    IsoDate,
}

/// Immutable declaration of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFieldSpec {
    pub name: FieldName,
    pub description: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

/// Error raised when constructing an invalid schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Duplicate field in schema: {0}")]
    DuplicateField(FieldName),
    #[error("Schema must contain at least one field")]
    Empty,
}

/// Ordered sequence of field specs.
///
/// # Invariants
///
/// - field names are unique
/// - ordering is the elicitation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    fields: Vec<FormFieldSpec>,
}

impl FormSchema {
    /// Builds a schema from an ordered field list.
    ///
    /// # Errors
    ///
    /// - `Empty` if no fields are given
    /// - `DuplicateField` if a name appears twice
    pub fn new(fields: Vec<FormFieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (i, spec) in fields.iter().enumerate() {
            if fields[..i].iter().any(|s| s.name == spec.name) {
                return Err(SchemaError::DuplicateField(spec.name));
            }
        }
        Ok(Self { fields })
    }

    /// The standard ten-field intake schema.
    pub fn standard() -> Self {
        let fields = vec![
            FormFieldSpec {
                name: FieldName::FullName,
                description: "your full name",
                required: true,
                kind: FieldKind::Text {
                    min_len: 2,
                    max_len: 100,
                },
            },
            FormFieldSpec {
                name: FieldName::Email,
                description: "your email address",
                required: true,
                kind: FieldKind::EmailAddress,
            },
            FormFieldSpec {
                name: FieldName::Age,
                description: "your age in years",
                required: true,
                kind: FieldKind::Integer { min: 18, max: 120 },
            },
            FormFieldSpec {
                name: FieldName::Occupation,
                description: "your current job or profession",
                required: true,
                kind: FieldKind::Text {
                    min_len: 2,
                    max_len: 100,
                },
            },
            FormFieldSpec {
                name: FieldName::ExperienceLevel,
                description: "your experience level in your field",
                required: true,
                kind: FieldKind::Choice {
                    options: EXPERIENCE_LEVELS,
                },
            },
            FormFieldSpec {
                name: FieldName::PreferredLanguage,
                description: "your preferred programming language",
                required: true,
                kind: FieldKind::Choice {
                    options: PREFERRED_LANGUAGES,
                },
            },
            FormFieldSpec {
                name: FieldName::ProjectInterests,
                description: "the project areas you are interested in",
                required: true,
                kind: FieldKind::TextList {
                    min_items: 1,
                    max_items: 5,
                    item_min_len: 2,
                    item_max_len: 100,
                },
            },
            FormFieldSpec {
                name: FieldName::AvailabilityPerWeek,
                description: "the hours per week you can dedicate to the project",
                required: true,
                kind: FieldKind::Integer { min: 1, max: 168 },
            },
            FormFieldSpec {
                name: FieldName::StartDate,
                description: "your preferred project start date",
                required: true,
                kind: FieldKind::IsoDate,
            },
            FormFieldSpec {
                name: FieldName::AdditionalNotes,
                description: "any additional information or special requirements",
                required: false,
                kind: FieldKind::Text {
                    min_len: 0,
                    max_len: 500,
                },
            },
        ];

        // The standard field list is statically well-formed.
        Self { fields }
    }

    /// All fields in elicitation order.
    pub fn fields(&self) -> &[FormFieldSpec] {
        &self.fields
    }

    /// Looks up the spec for a field.
    pub fn field(&self, name: FieldName) -> Option<&FormFieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The first field to elicit.
    pub fn first_field(&self) -> FieldName {
        self.fields[0].name
    }

    /// The field following `name`, or `None` if `name` is the last field.
    pub fn next_field(&self, name: FieldName) -> Option<FieldName> {
        let index = self.fields.iter().position(|f| f.name == name)?;
        self.fields.get(index + 1).map(|f| f.name)
    }

    /// Whether a field must be filled before the form can complete.
    pub fn is_required(&self, name: FieldName) -> bool {
        self.field(name).map(|f| f.required).unwrap_or(false)
    }

    /// Names of all required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }
}

/// Process-wide schema instance.
pub static FORM_SCHEMA: Lazy<FormSchema> = Lazy::new(FormSchema::standard);
