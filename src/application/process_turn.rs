//! ProcessTurnHandler - Run one user turn through the dialogue machine.
//!
//! Sequencing contract: one turn per session at a time. The handler loads
//! the session, resolves the turn's intent (deterministic confirmation
//! bypass or extraction backend with fallback), computes the successor state
//! with `DialogueMachine::advance`, and persists it only once the transition
//! has fully completed.

use std::sync::Arc;
use tracing::warn;

use crate::domain::dialogue::{lexical_confirmation, DialogueMachine, SessionState, Speaker};
use crate::domain::foundation::ConversationId;
use crate::ports::{
    extract_or_fallback, ExtractionRequest, IntentExtractor, SessionStore, SessionStoreError,
};

/// Command to process one user turn.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub conversation_id: ConversationId,
    pub user_text: String,
}

/// Result of a capture/transcription attempt from the device layer.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub success: bool,
    pub text: Option<String>,
    pub error: Option<String>,
}

/// Whether the turn changed the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// The turn was processed and the session advanced.
    Processed,
    /// Empty or failed input; the session was left untouched.
    InputIgnored,
}

/// Result of processing a turn.
#[derive(Debug, Clone)]
pub struct ProcessTurnResult {
    pub session: SessionState,
    /// Assistant messages produced by this turn, in order.
    pub replies: Vec<String>,
    pub status: TurnStatus,
}

/// Error type for processing a turn.
#[derive(Debug, thiserror::Error)]
pub enum ProcessTurnError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for ProcessTurnError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => ProcessTurnError::NotFound(id),
            other => ProcessTurnError::Storage(other.to_string()),
        }
    }
}

/// Handler for processing user turns.
pub struct ProcessTurnHandler {
    store: Arc<dyn SessionStore>,
    extractor: Arc<dyn IntentExtractor>,
    machine: DialogueMachine,
}

impl ProcessTurnHandler {
    pub fn new(store: Arc<dyn SessionStore>, extractor: Arc<dyn IntentExtractor>) -> Self {
        Self {
            store,
            extractor,
            machine: DialogueMachine::new(),
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessTurnCommand,
    ) -> Result<ProcessTurnResult, ProcessTurnError> {
        let session = self.store.load(cmd.conversation_id).await?;

        // Empty or whitespace-only input never reaches extraction and leaves
        // no transcript entry.
        let user_text = cmd.user_text.trim();
        if user_text.is_empty() {
            return Ok(ProcessTurnResult {
                session,
                replies: Vec::new(),
                status: TurnStatus::InputIgnored,
            });
        }

        let intent = if session.confirmation_pending {
            lexical_confirmation(user_text, session.pending_value.clone())
        } else {
            let spec = self
                .machine
                .schema()
                .field(session.current_field)
                .expect("current field is always in the schema");
            let request = ExtractionRequest {
                user_text,
                field: spec,
                history: session.recent_messages(),
                pending_value: session.pending_value.as_ref(),
            };
            extract_or_fallback(self.extractor.as_ref(), request).await
        };

        let next = self.machine.advance(&session, user_text, &intent);
        self.store.save(&next).await?;

        let replies = new_replies(&session, &next);
        Ok(ProcessTurnResult {
            session: next,
            replies,
            status: TurnStatus::Processed,
        })
    }

    /// Processes a device-layer capture result. A failed capture is an
    /// ignored turn: no session mutation, with the error surfaced as a
    /// reply for the user-facing layer.
    pub async fn handle_capture(
        &self,
        conversation_id: ConversationId,
        capture: CaptureOutcome,
    ) -> Result<ProcessTurnResult, ProcessTurnError> {
        match capture {
            CaptureOutcome {
                success: true,
                text: Some(text),
                ..
            } => {
                self.handle(ProcessTurnCommand {
                    conversation_id,
                    user_text: text,
                })
                .await
            }
            CaptureOutcome { error, .. } => {
                warn!(conversation = %conversation_id, ?error, "capture failed");
                let session = self.store.load(conversation_id).await?;
                let surfaced = error.unwrap_or_else(|| "No input captured".to_string());
                Ok(ProcessTurnResult {
                    session,
                    replies: vec![format!("I couldn't hear that ({}). Please try again.", surfaced)],
                    status: TurnStatus::InputIgnored,
                })
            }
        }
    }
}

/// Assistant messages appended by this turn.
fn new_replies(before: &SessionState, after: &SessionState) -> Vec<String> {
    after.messages[before.messages.len()..]
        .iter()
        .filter(|m| m.speaker == Speaker::Assistant)
        .map(|m| m.text.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySessionStore, MockExtractor};
    use crate::application::StartConversationHandler;
    use crate::domain::dialogue::{IntentKind, HISTORY_WINDOW};
    use crate::domain::schema::FieldName;
    use serde_json::json;

    async fn setup(
        extractor: MockExtractor,
    ) -> (Arc<InMemorySessionStore>, ProcessTurnHandler, ConversationId) {
        let store = Arc::new(InMemorySessionStore::new());
        let started = StartConversationHandler::new(store.clone())
            .handle()
            .await
            .unwrap();
        let handler = ProcessTurnHandler::new(store.clone(), Arc::new(extractor));
        (store, handler, started.session.conversation_id)
    }

    fn cmd(id: ConversationId, text: &str) -> ProcessTurnCommand {
        ProcessTurnCommand {
            conversation_id: id,
            user_text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn provided_value_reaches_confirmation() {
        let extractor = MockExtractor::new().with_value(json!("John Smith"));
        let (_store, handler, id) = setup(extractor).await;

        let result = handler.handle(cmd(id, "John Smith")).await.unwrap();

        assert_eq!(result.status, TurnStatus::Processed);
        assert!(result.session.confirmation_pending);
        assert_eq!(result.replies.len(), 1);
        assert!(result.replies[0].contains("Is that correct?"));
    }

    #[tokio::test]
    async fn confirmation_uses_lexical_bypass_without_backend_call() {
        let extractor = MockExtractor::new().with_value(json!("John Smith"));
        let probe = extractor.clone();
        let (store, handler, id) = setup(extractor).await;

        handler.handle(cmd(id, "John Smith")).await.unwrap();
        let result = handler.handle(cmd(id, "yes")).await.unwrap();

        // Only the first turn hit the extractor.
        assert_eq!(probe.calls().len(), 1);
        assert_eq!(result.session.current_field, FieldName::Email);

        let persisted = store.load(id).await.unwrap();
        assert!(persisted.is_field_completed(FieldName::FullName));
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let extractor = MockExtractor::new();
        let probe = extractor.clone();
        let (store, handler, id) = setup(extractor).await;
        let before = store.load(id).await.unwrap();

        let result = handler.handle(cmd(id, "   \t")).await.unwrap();

        assert_eq!(result.status, TurnStatus::InputIgnored);
        assert!(result.replies.is_empty());
        assert_eq!(store.load(id).await.unwrap(), before);
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_reprompt() {
        let extractor = MockExtractor::new().with_error("connection refused");
        let (store, handler, id) = setup(extractor).await;

        let result = handler.handle(cmd(id, "John Smith")).await.unwrap();

        assert_eq!(result.status, TurnStatus::Processed);
        assert_eq!(result.session.current_field, FieldName::FullName);
        assert_eq!(result.session.extraction_attempts, 0);
        assert!(!result.replies.is_empty());
        // The turn is still recorded; the session stays resumable.
        let persisted = store.load(id).await.unwrap();
        assert_eq!(persisted, result.session);
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let (_store, handler, _id) = setup(MockExtractor::new()).await;
        let result = handler.handle(cmd(ConversationId::new(), "hello")).await;
        assert!(matches!(result, Err(ProcessTurnError::NotFound(_))));
    }

    #[tokio::test]
    async fn history_window_is_bounded() {
        let extractor = MockExtractor::new()
            .with_kind(IntentKind::Other)
            .with_kind(IntentKind::Other)
            .with_kind(IntentKind::Other)
            .with_kind(IntentKind::Other);
        let probe = extractor.clone();
        let (_store, handler, id) = setup(extractor).await;

        for i in 0..4 {
            handler.handle(cmd(id, &format!("turn {}", i))).await.unwrap();
        }

        let calls = probe.calls();
        assert!(calls.iter().all(|c| c.history_len <= HISTORY_WINDOW));
    }

    #[tokio::test]
    async fn failed_capture_surfaces_error_without_mutation() {
        let (store, handler, id) = setup(MockExtractor::new()).await;
        let before = store.load(id).await.unwrap();

        let result = handler
            .handle_capture(
                id,
                CaptureOutcome {
                    success: false,
                    text: None,
                    error: Some("microphone unavailable".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status, TurnStatus::InputIgnored);
        assert!(result.replies[0].contains("microphone unavailable"));
        assert_eq!(store.load(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn successful_capture_is_processed() {
        let extractor = MockExtractor::new().with_value(json!("John Smith"));
        let (_store, handler, id) = setup(extractor).await;

        let result = handler
            .handle_capture(
                id,
                CaptureOutcome {
                    success: true,
                    text: Some("John Smith".to_string()),
                    error: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status, TurnStatus::Processed);
        assert!(result.session.confirmation_pending);
    }
}
