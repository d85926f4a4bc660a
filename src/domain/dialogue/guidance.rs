//! User-facing message composition.
//!
//! Pure formatting: prompts, help texts, validation guidance, and the
//! completion summary. Never fails; unknown situations fall back to generic
//! templates.

use crate::domain::schema::{
    FieldKind, FieldName, FormFieldSpec, EXPERIENCE_LEVELS, PREFERRED_LANGUAGES,
};

use super::validator::ValidationFailure;

/// Failed attempts on one field before guidance escalates with examples.
pub const ESCALATION_THRESHOLD: u32 = 3;

/// Generic re-prompt for unrecognized input.
pub const REPROMPT_MESSAGE: &str = "I didn't quite catch that. Could you repeat it?";

/// Apology used when a turn hits an unexpected internal failure.
pub const TROUBLE_MESSAGE: &str =
    "I'm having trouble processing your input. Could you please try again?";

/// Greeting seeded into a fresh session.
pub fn greeting() -> String {
    "Hello! I'm here to help you complete this form. Let's start with your full name. \
     What is your full name?"
        .to_string()
}

/// Per-field explanation of what a valid value looks like.
fn explanation(name: FieldName) -> &'static str {
    match name {
        FieldName::FullName => "Your name should be between 2 and 100 characters.",
        FieldName::Email => "Please provide a valid email address.",
        FieldName::Age => "Your age should be a number between 18 and 120.",
        FieldName::Occupation => "Your occupation should be between 2 and 100 characters.",
        FieldName::ExperienceLevel => "Please select one of the valid experience levels.",
        FieldName::PreferredLanguage => "Please select one of the valid programming languages.",
        FieldName::ProjectInterests => "Please provide 1 to 5 project interests.",
        FieldName::AvailabilityPerWeek => {
            "Please provide a number between 1 and 168 for weekly availability hours."
        }
        FieldName::StartDate => "Please provide a valid date in YYYY-MM-DD format.",
        FieldName::AdditionalNotes => "Notes can be up to 500 characters.",
    }
}

/// Example valid values, shown in help and escalated guidance.
fn examples(name: FieldName) -> &'static [&'static str] {
    match name {
        FieldName::FullName => &["John Smith", "Maria Rodriguez", "Ahmed Khan"],
        FieldName::Email => &["user@example.com", "name.surname@company.co.uk"],
        FieldName::Age => &["30", "45", "62"],
        FieldName::Occupation => &["Software Developer", "Teacher", "Nurse"],
        FieldName::ExperienceLevel => EXPERIENCE_LEVELS,
        FieldName::PreferredLanguage => PREFERRED_LANGUAGES,
        FieldName::ProjectInterests => &[
            "Web Development",
            "Machine Learning, Data Analysis",
            "Game Development, Mobile Apps, Cloud Computing",
        ],
        FieldName::AvailabilityPerWeek => &["10", "20", "40"],
        FieldName::StartDate => &["2025-06-01", "2025-07-15", "2025-08-30"],
        FieldName::AdditionalNotes => &["Looking for collaborative projects with flexible hours."],
    }
}

/// Prompt asking for a field's value, customized per field type.
pub fn prompt_for(spec: &FormFieldSpec) -> String {
    match spec.name {
        FieldName::ExperienceLevel => format!(
            "Now, please tell me your experience level. Choose from: {}.",
            EXPERIENCE_LEVELS.join(", ")
        ),
        FieldName::PreferredLanguage => format!(
            "What's your preferred programming language? Options are: {}.",
            PREFERRED_LANGUAGES.join(", ")
        ),
        FieldName::ProjectInterests => {
            "What projects are you interested in? You can list between 1 and 5 interests."
                .to_string()
        }
        FieldName::StartDate => {
            "When would you like to start? Please provide a date in YYYY-MM-DD format.".to_string()
        }
        _ => format!("Now, please tell me {}.", spec.description),
    }
}

/// Prompt echoing an extracted value before committing it.
pub fn confirmation_prompt(name: FieldName, value_display: &str) -> String {
    format!(
        "I've captured that your {} is: {}. Is that correct?",
        name, value_display
    )
}

/// Acknowledgement after a value is committed.
pub fn saved_message(name: FieldName, value_display: &str) -> String {
    format!("Great! I've saved your {}: {}", name, value_display)
}

/// Re-ask after the user denies a captured value.
pub fn reask_message(name: FieldName) -> String {
    format!(
        "I apologize for the misunderstanding. Let's try again. What is your {}?",
        name
    )
}

/// Rejection when skipping a required field.
pub fn cannot_skip_message(name: FieldName) -> String {
    format!(
        "I'm sorry, but {} is a required field and cannot be skipped. \
         Could you please provide this information?",
        name
    )
}

/// Acknowledgement when an optional field is skipped.
pub fn skipped_message(name: FieldName) -> String {
    format!("No problem, we can skip the {} field.", name)
}

/// Guidance after a validation failure. Escalates with examples once the
/// attempt count reaches [`ESCALATION_THRESHOLD`].
pub fn guidance(spec: &FormFieldSpec, failure: &ValidationFailure, attempts: u32) -> String {
    let mut message = format!(
        "I'm having trouble understanding your {}. {} Could you please try again?",
        spec.name,
        explanation(spec.name)
    );
    if let Some(options) = &failure.valid_options {
        message.push_str(&format!(" Valid options are: {}.", options.join(", ")));
    } else if let Some(hint) = &failure.hint {
        message.push_str(&format!(" ({})", hint));
    }
    if let Some(correction) = &failure.suggested_correction {
        message.push_str(&format!(" Did you mean {}?", correction));
    }
    if attempts >= ESCALATION_THRESHOLD {
        message.push_str(&format!(
            " For example: {}.",
            examples(spec.name).join("; ")
        ));
    }
    message
}

/// Help text for a field.
pub fn help(spec: &FormFieldSpec) -> String {
    match spec.name {
        FieldName::FullName => {
            "I need your full name. For example, 'John Smith' or 'Maria Rodriguez'.".to_string()
        }
        FieldName::Email => {
            "I need a valid email address where you can be contacted. \
             For example, 'user@example.com'."
                .to_string()
        }
        FieldName::Age => "Please provide your age as a number between 18 and 120.".to_string(),
        FieldName::ExperienceLevel => format!(
            "Please select your experience level from: {}.",
            EXPERIENCE_LEVELS.join(", ")
        ),
        FieldName::PreferredLanguage => format!(
            "Please select your preferred programming language from: {}.",
            PREFERRED_LANGUAGES.join(", ")
        ),
        FieldName::ProjectInterests => {
            "Please list between 1 and 5 project areas you're interested in. \
             For example, 'Web Development, Machine Learning'."
                .to_string()
        }
        FieldName::AvailabilityPerWeek => {
            "How many hours per week can you dedicate to the project? \
             Please provide a number between 1 and 168."
                .to_string()
        }
        FieldName::StartDate => {
            "When would you like to start? Please provide a date in YYYY-MM-DD format, \
             for example, '2025-06-01'."
                .to_string()
        }
        _ => format!(
            "I need information about {}. Could you please provide that?",
            spec.description
        ),
    }
}

/// Completion summary listing every accepted (non-null) value.
pub fn summary_message(entries: &[(FieldName, String)]) -> String {
    let summary: Vec<String> = entries
        .iter()
        .map(|(name, value)| format!("- {}: {}", name, value))
        .collect();
    format!(
        "Excellent! We've completed all the required information. \
         Here's a summary of what you've provided:\n\n{}\n\n\
         Thank you for providing all this information. The form has been submitted successfully.",
        summary.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialogue::validator::{ConstraintViolation, ValidationOutcome};
    use crate::domain::schema::FORM_SCHEMA;
    use serde_json::json;

    fn spec(name: FieldName) -> &'static FormFieldSpec {
        FORM_SCHEMA.field(name).unwrap()
    }

    fn age_failure() -> ValidationFailure {
        match crate::domain::dialogue::validator::validate(spec(FieldName::Age), &json!(15)) {
            ValidationOutcome::Invalid(failure) => failure,
            _ => unreachable!(),
        }
    }

    #[test]
    fn age_guidance_references_range() {
        let message = guidance(spec(FieldName::Age), &age_failure(), 1);
        assert!(message.contains("between 18 and 120"));
        assert!(message.contains("age"));
    }

    #[test]
    fn guidance_escalates_with_examples_at_threshold() {
        let below = guidance(spec(FieldName::Age), &age_failure(), ESCALATION_THRESHOLD - 1);
        let at = guidance(spec(FieldName::Age), &age_failure(), ESCALATION_THRESHOLD);
        assert!(!below.contains("For example"));
        assert!(at.contains("For example"));
        assert!(at.contains("30"));
    }

    #[test]
    fn choice_guidance_lists_options() {
        let failure = ValidationFailure {
            violation: ConstraintViolation::NotAnOption { given: "Guru".into() },
            valid_options: Some(EXPERIENCE_LEVELS.iter().map(|s| s.to_string()).collect()),
            hint: None,
            suggested_correction: None,
        };
        let message = guidance(spec(FieldName::ExperienceLevel), &failure, 1);
        assert!(message.contains("Beginner, Intermediate, Advanced, Expert"));
    }

    #[test]
    fn choice_prompt_names_the_options() {
        let prompt = prompt_for(spec(FieldName::PreferredLanguage));
        assert!(prompt.contains("Python"));
        assert!(prompt.contains("Rust"));
    }

    #[test]
    fn help_covers_every_field() {
        for field_spec in FORM_SCHEMA.fields() {
            let text = help(field_spec);
            assert!(!text.is_empty());
        }
    }

    #[test]
    fn summary_lists_entries_in_order() {
        let message = summary_message(&[
            (FieldName::FullName, "John Smith".to_string()),
            (FieldName::Age, "30".to_string()),
        ]);
        let name_pos = message.find("- full_name: John Smith").unwrap();
        let age_pos = message.find("- age: 30").unwrap();
        assert!(name_pos < age_pos);
    }
}
