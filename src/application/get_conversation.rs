//! GetConversationHandler - Read-only session fetch for the UI layer.

use std::sync::Arc;

use crate::domain::dialogue::SessionState;
use crate::domain::foundation::ConversationId;
use crate::ports::{SessionStore, SessionStoreError};

/// Error type for fetching a conversation.
#[derive(Debug, thiserror::Error)]
pub enum GetConversationError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for GetConversationError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => GetConversationError::NotFound(id),
            other => GetConversationError::Storage(other.to_string()),
        }
    }
}

/// Handler that loads a session without mutating it.
pub struct GetConversationHandler {
    store: Arc<dyn SessionStore>,
}

impl GetConversationHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        conversation_id: ConversationId,
    ) -> Result<SessionState, GetConversationError> {
        Ok(self.store.load(conversation_id).await?)
    }
}
