//! Session Store Port - Interface for persisting conversation sessions.
//!
//! Sessions are keyed by conversation id with no cross-session sharing; the
//! core stays storage-agnostic.

use async_trait::async_trait;

use crate::domain::dialogue::SessionState;
use crate::domain::foundation::ConversationId;

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(ConversationId),

    #[error("Failed to serialize session: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Port for persisting and loading session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save a session, replacing any previous snapshot.
    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError>;

    /// Load a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::NotFound` if no session exists.
    async fn load(&self, id: ConversationId) -> Result<SessionState, SessionStoreError>;

    /// Check whether a session exists.
    async fn exists(&self, id: ConversationId) -> Result<bool, SessionStoreError>;

    /// Delete a session, if present.
    async fn delete(&self, id: ConversationId) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_names_the_conversation() {
        let id = ConversationId::new();
        let err = SessionStoreError::NotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
