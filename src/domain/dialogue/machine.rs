//! Dialogue state machine — the workflow core.
//!
//! Each user turn is a pure transition: `advance` takes the current session
//! state plus the turn's extracted intent and produces the successor state.
//! Nothing is mutated in place; the caller persists the result, so a turn
//! either applies completely or not at all.
//!
//! Per-field flow: eliciting → awaiting confirmation → (confirm) next field
//! or (deny) back to eliciting. Help and skip requests are handled without
//! moving the field pointer; the terminal state is reached once every
//! required field holds an accepted value.

use tracing::{debug, info};

use crate::domain::schema::{FormSchema, FORM_SCHEMA};

use super::guidance;
use super::intent::{ExtractedIntent, IntentKind};
use super::session_state::{SessionState, Speaker};
use super::validator::{self, ValidationOutcome};
use super::values::FieldValue;

/// Extraction confidence below which a provided value is treated as
/// unrecognized input rather than a candidate value.
pub const MIN_EXTRACTION_CONFIDENCE: f32 = 0.3;

/// Drives one conversation through the form schema.
#[derive(Debug, Clone)]
pub struct DialogueMachine {
    schema: &'static FormSchema,
}

impl Default for DialogueMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogueMachine {
    pub fn new() -> Self {
        Self { schema: &FORM_SCHEMA }
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.schema
    }

    /// Processes one user turn and returns the successor session state.
    ///
    /// The caller resolves the intent first (lexical confirmation bypass or
    /// extraction backend) and must not call this with empty input.
    pub fn advance(
        &self,
        session: &SessionState,
        user_text: &str,
        intent: &ExtractedIntent,
    ) -> SessionState {
        let mut next = session.clone();
        next.add_message(Speaker::User, user_text);

        debug!(
            conversation = %next.conversation_id,
            field = %next.current_field,
            intent = %intent.intent,
            confidence = intent.confidence,
            confirming = next.confirmation_pending,
            "processing turn"
        );

        if next.confirmation_pending {
            self.handle_confirmation(&mut next, intent);
        } else {
            self.handle_elicitation(&mut next, intent);
        }

        next
    }

    /// Confirm commits the pending value; anything else is treated as a
    /// denial and the field is re-asked.
    fn handle_confirmation(&self, session: &mut SessionState, intent: &ExtractedIntent) {
        if intent.intent == IntentKind::Confirm {
            self.commit_pending(session);
        } else {
            session.confirmation_pending = false;
            session.pending_value = None;
            session.extraction_attempts = 0;
            let reask = guidance::reask_message(session.current_field);
            session.add_message(Speaker::Assistant, reask);
        }
    }

    fn handle_elicitation(&self, session: &mut SessionState, intent: &ExtractedIntent) {
        match intent.intent {
            IntentKind::ProvideValue if intent.confidence >= MIN_EXTRACTION_CONFIDENCE => {
                self.handle_provided_value(session, intent);
            }
            IntentKind::RequestHelp => {
                let spec = self
                    .schema
                    .field(session.current_field)
                    .expect("current field is always in the schema");
                session.add_message(Speaker::Assistant, guidance::help(spec));
            }
            IntentKind::RequestSkip => self.handle_skip(session),
            // Unrecognized (or low-confidence) input is re-prompted without
            // counting toward the escalation threshold.
            _ => {
                session.add_message(Speaker::Assistant, guidance::REPROMPT_MESSAGE);
            }
        }
    }

    fn handle_provided_value(&self, session: &mut SessionState, intent: &ExtractedIntent) {
        let spec = self
            .schema
            .field(session.current_field)
            .expect("current field is always in the schema");
        let raw = intent.value.clone().unwrap_or(serde_json::Value::Null);

        match validator::validate(spec, &raw) {
            ValidationOutcome::Valid(value) => {
                session.pending_value = Some(raw);
                session.confirmation_pending = true;
                let prompt =
                    guidance::confirmation_prompt(session.current_field, &value.to_string());
                session.add_message(Speaker::Assistant, prompt);
            }
            ValidationOutcome::Invalid(failure) => {
                session.extraction_attempts += 1;
                debug!(
                    field = %session.current_field,
                    attempts = session.extraction_attempts,
                    violation = %failure.violation,
                    "validation failed"
                );
                let message = guidance::guidance(spec, &failure, session.extraction_attempts);
                session.add_message(Speaker::Assistant, message);
            }
        }
    }

    /// Re-validates the pending value and commits it.
    ///
    /// The value already passed validation before the confirmation prompt;
    /// the re-check guards against a pending value going stale. On the
    /// unexpected failure path the confirmation is abandoned and guidance is
    /// emitted instead of committing.
    fn commit_pending(&self, session: &mut SessionState) {
        let spec = self
            .schema
            .field(session.current_field)
            .expect("current field is always in the schema");
        let raw = session.pending_value.take().unwrap_or(serde_json::Value::Null);
        session.confirmation_pending = false;

        match validator::validate(spec, &raw) {
            ValidationOutcome::Valid(value) => {
                let display = value.to_string();
                session
                    .field_values
                    .insert(session.current_field, Some(value));
                if !session.completed_fields.contains(&session.current_field) {
                    session.completed_fields.push(session.current_field);
                }
                session.extraction_attempts = 0;
                info!(
                    conversation = %session.conversation_id,
                    field = %session.current_field,
                    "field committed"
                );
                let saved = guidance::saved_message(session.current_field, &display);
                session.add_message(Speaker::Assistant, saved);
                self.advance_field(session);
            }
            ValidationOutcome::Invalid(failure) => {
                session.extraction_attempts += 1;
                let message = guidance::guidance(spec, &failure, session.extraction_attempts);
                session.add_message(Speaker::Assistant, message);
            }
        }
    }

    fn handle_skip(&self, session: &mut SessionState) {
        if self.schema.is_required(session.current_field) {
            let message = guidance::cannot_skip_message(session.current_field);
            session.add_message(Speaker::Assistant, message);
            return;
        }

        session.field_values.insert(session.current_field, None);
        if !session.completed_fields.contains(&session.current_field) {
            session.completed_fields.push(session.current_field);
        }
        session.extraction_attempts = 0;
        info!(
            conversation = %session.conversation_id,
            field = %session.current_field,
            "optional field skipped"
        );
        let message = guidance::skipped_message(session.current_field);
        session.add_message(Speaker::Assistant, message);
        self.advance_field(session);
    }

    /// Moves to the next schema field, or runs the completion check when the
    /// last field has been resolved.
    fn advance_field(&self, session: &mut SessionState) {
        match self.schema.next_field(session.current_field) {
            Some(next_field) => {
                session.current_field = next_field;
                session.extraction_attempts = 0;
                let spec = self
                    .schema
                    .field(next_field)
                    .expect("next_field returns schema members");
                session.add_message(Speaker::Assistant, guidance::prompt_for(spec));
            }
            None => self.check_completion(session),
        }
    }

    /// Completion holds iff every required field has an accepted value. The
    /// summary is emitted exactly once, on the first transition into the
    /// complete state.
    fn check_completion(&self, session: &mut SessionState) {
        let all_required_done = self
            .schema
            .required_fields()
            .all(|name| session.is_field_completed(name));
        if !all_required_done {
            return;
        }

        session.complete = true;

        let mut output = serde_json::Map::new();
        let mut summary_entries = Vec::new();
        for name in &session.completed_fields {
            if let Some(Some(value)) = session.committed_value(*name) {
                output.insert(name.as_str().to_string(), value.to_json());
                summary_entries.push((*name, value.to_string()));
            }
        }
        session.final_output = Some(output);

        if !session.summary_sent {
            session.summary_sent = true;
            info!(conversation = %session.conversation_id, "form complete");
            let message = guidance::summary_message(&summary_entries);
            session.add_message(Speaker::Assistant, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConversationId;
    use crate::domain::schema::FieldName;
    use serde_json::json;

    fn machine() -> DialogueMachine {
        DialogueMachine::new()
    }

    fn fresh_session() -> SessionState {
        let mut session = SessionState::new(ConversationId::new(), FORM_SCHEMA.first_field());
        session.add_message(Speaker::Assistant, guidance::greeting());
        session
    }

    fn provide(value: serde_json::Value) -> ExtractedIntent {
        ExtractedIntent {
            intent: IntentKind::ProvideValue,
            value: Some(value),
            confidence: 0.95,
            reasoning: "test".into(),
        }
    }

    fn intent(kind: IntentKind) -> ExtractedIntent {
        ExtractedIntent {
            intent: kind,
            value: None,
            confidence: 0.95,
            reasoning: "test".into(),
        }
    }

    fn last_reply(session: &SessionState) -> &str {
        &session.last_assistant_message().unwrap().text
    }

    /// Drives a session to a given field with all earlier fields committed.
    fn session_at(field: FieldName) -> SessionState {
        let values: &[(FieldName, serde_json::Value)] = &[
            (FieldName::FullName, json!("John Smith")),
            (FieldName::Email, json!("john@example.com")),
            (FieldName::Age, json!(30)),
            (FieldName::Occupation, json!("Software Developer")),
            (FieldName::ExperienceLevel, json!("Intermediate")),
            (FieldName::PreferredLanguage, json!("Rust")),
            (FieldName::ProjectInterests, json!(["Web Development"])),
            (FieldName::AvailabilityPerWeek, json!(20)),
            (FieldName::StartDate, json!("2025-06-01")),
        ];
        let m = machine();
        let mut session = fresh_session();
        for (name, value) in values {
            if *name == field {
                break;
            }
            session = m.advance(&session, "input", &provide(value.clone()));
            assert!(session.confirmation_pending, "value for {} should pend", name);
            session = m.advance(&session, "yes", &intent(IntentKind::Confirm));
            assert_eq!(session.current_field, name.next().unwrap());
        }
        session
    }

    // Elicitation

    #[test]
    fn valid_value_moves_to_confirmation() {
        let m = machine();
        let session = m.advance(&fresh_session(), "John Smith", &provide(json!("John Smith")));

        assert!(session.confirmation_pending);
        assert_eq!(session.pending_value, Some(json!("John Smith")));
        assert!(session.field_values.is_empty());
        assert!(last_reply(&session).contains("John Smith"));
        assert!(last_reply(&session).contains("Is that correct?"));
    }

    #[test]
    fn invalid_value_increments_attempts_and_guides() {
        let m = machine();
        let mut session = session_at(FieldName::Age);
        session = m.advance(&session, "fifteen", &provide(json!(15)));

        assert_eq!(session.current_field, FieldName::Age);
        assert_eq!(session.extraction_attempts, 1);
        assert!(!session.confirmation_pending);
        assert!(last_reply(&session).contains("between 18 and 120"));
    }

    #[test]
    fn third_failure_escalates_with_examples() {
        let m = machine();
        let mut session = session_at(FieldName::Age);
        for _ in 0..3 {
            session = m.advance(&session, "too young", &provide(json!(15)));
        }
        assert_eq!(session.extraction_attempts, 3);
        assert!(last_reply(&session).contains("For example"));
    }

    #[test]
    fn other_intent_reprompts_without_counting() {
        let m = machine();
        let session = m.advance(
            &fresh_session(),
            "mumble",
            &ExtractedIntent::fallback("unparseable"),
        );

        assert_eq!(session.extraction_attempts, 0);
        assert_eq!(session.current_field, FieldName::FullName);
        assert_eq!(last_reply(&session), guidance::REPROMPT_MESSAGE);
    }

    #[test]
    fn low_confidence_value_is_treated_as_unrecognized() {
        let m = machine();
        let low = ExtractedIntent {
            intent: IntentKind::ProvideValue,
            value: Some(json!("John Smith")),
            confidence: 0.1,
            reasoning: "guess".into(),
        };
        let session = m.advance(&fresh_session(), "static noise", &low);

        assert!(!session.confirmation_pending);
        assert_eq!(session.extraction_attempts, 0);
        assert_eq!(last_reply(&session), guidance::REPROMPT_MESSAGE);
    }

    #[test]
    fn help_request_leaves_state_unchanged() {
        let m = machine();
        let before = fresh_session();
        let session = m.advance(&before, "help me", &intent(IntentKind::RequestHelp));

        assert_eq!(session.current_field, before.current_field);
        assert_eq!(session.extraction_attempts, 0);
        assert!(!session.confirmation_pending);
        assert!(last_reply(&session).contains("full name"));
    }

    // Confirmation loop

    #[test]
    fn confirm_commits_and_advances_once() {
        let m = machine();
        let mut session = m.advance(&fresh_session(), "John Smith", &provide(json!("John Smith")));
        session = m.advance(&session, "yes", &intent(IntentKind::Confirm));

        assert_eq!(
            session.committed_value(FieldName::FullName),
            Some(&Some(FieldValue::Text("John Smith".into())))
        );
        assert_eq!(session.completed_fields, vec![FieldName::FullName]);
        assert_eq!(session.current_field, FieldName::Email);
        assert!(!session.confirmation_pending);
        assert_eq!(session.extraction_attempts, 0);
    }

    #[test]
    fn deny_discards_pending_value_and_reasks() {
        let m = machine();
        let mut session = m.advance(&fresh_session(), "John Smith", &provide(json!("John Smith")));
        session = m.advance(&session, "no", &intent(IntentKind::Deny));

        assert!(session.field_values.is_empty());
        assert_eq!(session.current_field, FieldName::FullName);
        assert!(!session.confirmation_pending);
        assert!(session.pending_value.is_none());
        assert_eq!(session.extraction_attempts, 0);
        assert!(last_reply(&session).contains("Let's try again"));
    }

    #[test]
    fn non_confirm_intent_while_confirming_falls_back_to_deny() {
        let m = machine();
        let mut session = m.advance(&fresh_session(), "John Smith", &provide(json!("John Smith")));
        session = m.advance(&session, "help", &intent(IntentKind::RequestHelp));

        assert!(!session.confirmation_pending);
        assert!(session.field_values.is_empty());
        assert_eq!(session.current_field, FieldName::FullName);
        assert!(last_reply(&session).contains("Let's try again"));
    }

    #[test]
    fn commit_coerces_pending_numeric_string() {
        let m = machine();
        let mut session = session_at(FieldName::Age);
        session = m.advance(&session, "I'm thirty", &provide(json!("30")));
        session = m.advance(&session, "yes", &intent(IntentKind::Confirm));

        assert_eq!(
            session.committed_value(FieldName::Age),
            Some(&Some(FieldValue::Integer(30)))
        );
    }

    // Skip semantics

    #[test]
    fn skip_on_required_field_is_rejected() {
        let m = machine();
        let before = session_at(FieldName::Occupation);
        let session = m.advance(&before, "skip this", &intent(IntentKind::RequestSkip));

        assert_eq!(session.current_field, FieldName::Occupation);
        assert_eq!(session.completed_fields, before.completed_fields);
        assert!(last_reply(&session).contains("cannot be skipped"));
    }

    #[test]
    fn skip_on_optional_field_commits_null_and_completes() {
        let m = machine();
        let before = session_at(FieldName::AdditionalNotes);
        let session = m.advance(&before, "skip please", &intent(IntentKind::RequestSkip));

        assert_eq!(
            session.committed_value(FieldName::AdditionalNotes),
            Some(&None)
        );
        assert!(session.is_field_completed(FieldName::AdditionalNotes));
        assert!(session.complete);
        let output = session.final_output.as_ref().unwrap();
        assert!(!output.contains_key("additional_notes"));
        assert_eq!(output.get("full_name"), Some(&json!("John Smith")));
    }

    // Completion

    #[test]
    fn full_traversal_completes_exactly_once() {
        let m = machine();
        let mut session = session_at(FieldName::AdditionalNotes);
        session = m.advance(&session, "No special requirements", &provide(json!("No special requirements")));
        session = m.advance(&session, "yes", &intent(IntentKind::Confirm));

        assert!(session.complete);
        let output = session.final_output.as_ref().unwrap();
        assert_eq!(output.len(), 10);
        assert_eq!(output.get("age"), Some(&json!(30)));
        assert_eq!(output.get("project_interests"), Some(&json!(["Web Development"])));
        assert_eq!(output.get("start_date"), Some(&json!("2025-06-01")));

        let summaries = session
            .messages
            .iter()
            .filter(|msg| msg.text.contains("Here's a summary"))
            .count();
        assert_eq!(summaries, 1);
    }

    #[test]
    fn completion_summary_is_idempotent() {
        let m = machine();
        let mut session = session_at(FieldName::AdditionalNotes);
        session = m.advance(&session, "skip", &intent(IntentKind::RequestSkip));
        assert!(session.complete);

        // A committing transition after completion must not duplicate the summary.
        let mut again = session.clone();
        m.check_completion(&mut again);
        let summaries = again
            .messages
            .iter()
            .filter(|msg| msg.text.contains("Here's a summary"))
            .count();
        assert_eq!(summaries, 1);
    }

    #[test]
    fn missing_extracted_value_counts_as_failed_attempt() {
        let m = machine();
        let no_value = ExtractedIntent {
            intent: IntentKind::ProvideValue,
            value: None,
            confidence: 0.8,
            reasoning: "nothing usable".into(),
        };
        let session = m.advance(&fresh_session(), "ummm", &no_value);

        assert_eq!(session.extraction_attempts, 1);
        assert!(!session.confirmation_pending);
    }

    #[test]
    fn every_turn_appends_the_user_message() {
        let m = machine();
        let before = fresh_session();
        let session = m.advance(&before, "John Smith", &provide(json!("John Smith")));
        let user_turns: Vec<&str> = session
            .messages
            .iter()
            .filter(|msg| msg.speaker == Speaker::User)
            .map(|msg| msg.text.as_str())
            .collect();
        assert_eq!(user_turns, vec!["John Smith"]);
    }
}
