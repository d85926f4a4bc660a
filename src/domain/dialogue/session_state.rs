//! Session state entity.
//!
//! One `SessionState` exists per conversation. It is created at conversation
//! start and mutated exclusively by the dialogue state machine, one turn at a
//! time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ConversationId, MessageId};
use crate::domain::schema::FieldName;

use super::values::FieldValue;

/// Number of recent transcript turns handed to the extraction backend.
pub const HISTORY_WINDOW: usize = 5;

/// Who produced a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// One entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Complete state of one form-filling conversation.
///
/// # Invariants
///
/// - `current_field` is always a valid schema field name
/// - `field_values` holds an entry for every name in `completed_fields`
///   (`None` marks a skipped optional field)
/// - `pending_value` is meaningful only while `confirmation_pending` is true
/// - `messages` is append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub conversation_id: ConversationId,
    pub current_field: FieldName,
    pub completed_fields: Vec<FieldName>,
    pub field_values: HashMap<FieldName, Option<FieldValue>>,
    pub pending_value: Option<serde_json::Value>,
    pub confirmation_pending: bool,
    pub extraction_attempts: u32,
    pub messages: Vec<Message>,
    pub complete: bool,
    pub summary_sent: bool,
    pub final_output: Option<serde_json::Map<String, serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Creates a fresh session positioned at `first_field`.
    pub fn new(conversation_id: ConversationId, first_field: FieldName) -> Self {
        let now = Utc::now();
        Self {
            conversation_id,
            current_field: first_field,
            completed_fields: Vec::new(),
            field_values: HashMap::new(),
            pending_value: None,
            confirmation_pending: false,
            extraction_attempts: 0,
            messages: Vec::new(),
            complete: false,
            summary_sent: false,
            final_output: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a transcript message and returns its id.
    pub fn add_message(&mut self, speaker: Speaker, text: impl Into<String>) -> MessageId {
        let id = MessageId::new();
        self.messages.push(Message {
            id,
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        });
        self.updated_at = Utc::now();
        id
    }

    /// The last `HISTORY_WINDOW` transcript entries, oldest first.
    pub fn recent_messages(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(HISTORY_WINDOW);
        &self.messages[start..]
    }

    /// Whether a field already holds an accepted (or skipped) value.
    pub fn is_field_completed(&self, name: FieldName) -> bool {
        self.completed_fields.contains(&name)
    }

    /// The accepted value for a field; `Some(None)` marks a skipped field.
    pub fn committed_value(&self, name: FieldName) -> Option<&Option<FieldValue>> {
        self.field_values.get(&name)
    }

    /// The most recent assistant message, if any.
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.speaker == Speaker::Assistant)
    }
}
