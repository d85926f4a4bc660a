//! The fixed set of form fields, in elicitation order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of one form field.
///
/// The declaration order here is also the field-advance order used by the
/// dialogue state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    FullName,
    Email,
    Age,
    Occupation,
    ExperienceLevel,
    PreferredLanguage,
    ProjectInterests,
    AvailabilityPerWeek,
    StartDate,
    AdditionalNotes,
}

impl FieldName {
    /// All fields in elicitation order.
    pub const ORDERED: [FieldName; 10] = [
        FieldName::FullName,
        FieldName::Email,
        FieldName::Age,
        FieldName::Occupation,
        FieldName::ExperienceLevel,
        FieldName::PreferredLanguage,
        FieldName::ProjectInterests,
        FieldName::AvailabilityPerWeek,
        FieldName::StartDate,
        FieldName::AdditionalNotes,
    ];

    /// Returns the snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FullName => "full_name",
            FieldName::Email => "email",
            FieldName::Age => "age",
            FieldName::Occupation => "occupation",
            FieldName::ExperienceLevel => "experience_level",
            FieldName::PreferredLanguage => "preferred_language",
            FieldName::ProjectInterests => "project_interests",
            FieldName::AvailabilityPerWeek => "availability_per_week",
            FieldName::StartDate => "start_date",
            FieldName::AdditionalNotes => "additional_notes",
        }
    }

    /// Returns the field that follows this one, or `None` for the last field.
    pub fn next(&self) -> Option<FieldName> {
        let index = Self::ORDERED.iter().position(|f| f == self)?;
        Self::ORDERED.get(index + 1).copied()
    }

    /// Zero-based position in the elicitation order.
    pub fn ordinal(&self) -> usize {
        Self::ORDERED
            .iter()
            .position(|f| f == self)
            .unwrap_or(Self::ORDERED.len())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field name: {0}")]
pub struct UnknownFieldName(pub String);

impl FromStr for FieldName {
    type Err = UnknownFieldName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDERED
            .iter()
            .find(|f| f.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownFieldName(s.to_string()))
    }
}
