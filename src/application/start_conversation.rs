//! StartConversationHandler - Create a fresh form-filling session.

use std::sync::Arc;
use tracing::info;

use crate::domain::dialogue::{guidance, SessionState, Speaker};
use crate::domain::foundation::ConversationId;
use crate::domain::schema::FORM_SCHEMA;
use crate::ports::{SessionStore, SessionStoreError};

/// Result of starting a conversation.
#[derive(Debug, Clone)]
pub struct StartConversationResult {
    pub session: SessionState,
}

/// Error type for starting a conversation.
#[derive(Debug, thiserror::Error)]
pub enum StartConversationError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for StartConversationError {
    fn from(err: SessionStoreError) -> Self {
        StartConversationError::Storage(err.to_string())
    }
}

/// Handler that creates and persists a new session, seeded with the
/// greeting and positioned at the first schema field.
pub struct StartConversationHandler {
    store: Arc<dyn SessionStore>,
}

impl StartConversationHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<StartConversationResult, StartConversationError> {
        let mut session = SessionState::new(ConversationId::new(), FORM_SCHEMA.first_field());
        session.add_message(Speaker::Assistant, guidance::greeting());

        self.store.save(&session).await?;
        info!(conversation = %session.conversation_id, "conversation started");

        Ok(StartConversationResult { session })
    }
}
