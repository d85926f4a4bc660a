//! In-memory session store adapter.
//!
//! Keeps sessions in a map guarded by an async lock. Suitable for a single
//! process; independent conversations share nothing beyond the map itself.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::dialogue::SessionState;
use crate::domain::foundation::ConversationId;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for conversation sessions.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<ConversationId, SessionState>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored sessions (useful for tests).
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }

    /// Number of stored sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(state.conversation_id, state.clone());
        Ok(())
    }

    async fn load(&self, id: ConversationId) -> Result<SessionState, SessionStoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .cloned()
            .ok_or(SessionStoreError::NotFound(id))
    }

    async fn exists(&self, id: ConversationId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.read().await.contains_key(&id))
    }

    async fn delete(&self, id: ConversationId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialogue::Speaker;
    use crate::domain::schema::FORM_SCHEMA;

    fn test_state() -> SessionState {
        SessionState::new(ConversationId::new(), FORM_SCHEMA.first_field())
    }

    #[tokio::test]
    async fn save_and_load_round_trips() {
        let store = InMemorySessionStore::new();
        let state = test_state();

        store.save(&state).await.unwrap();
        let loaded = store.load(state.conversation_id).await.unwrap();

        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn load_missing_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let result = store.load(ConversationId::new()).await;
        assert!(matches!(result, Err(SessionStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let store = InMemorySessionStore::new();
        let mut state = test_state();
        store.save(&state).await.unwrap();

        state.add_message(Speaker::User, "hello");
        store.save(&state).await.unwrap();

        let loaded = store.load(state.conversation_id).await.unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemorySessionStore::new();
        let first = test_state();
        let second = test_state();

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(store.session_count().await, 2);
        let loaded = store.load(first.conversation_id).await.unwrap();
        assert_eq!(loaded.conversation_id, first.conversation_id);
    }

    #[tokio::test]
    async fn delete_removes_session() {
        let store = InMemorySessionStore::new();
        let state = test_state();
        store.save(&state).await.unwrap();

        store.delete(state.conversation_id).await.unwrap();

        assert!(!store.exists(state.conversation_id).await.unwrap());
    }
}
