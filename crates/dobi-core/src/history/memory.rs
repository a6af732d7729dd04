//! In-memory history repository for tests and ephemeral sessions.

use dashmap::DashMap;

use dobi_types::chat::{ConversationId, Turn};
use dobi_types::error::RepositoryError;

use super::repository::HistoryRepository;

#[derive(Default)]
pub struct InMemoryHistoryRepository {
    conversations: DashMap<ConversationId, Vec<Turn>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryRepository for InMemoryHistoryRepository {
    async fn load(&self, id: &ConversationId) -> Result<Vec<Turn>, RepositoryError> {
        Ok(self
            .conversations
            .get(id)
            .map(|turns| turns.value().clone())
            .unwrap_or_default())
    }

    async fn append(&self, id: &ConversationId, turns: &[Turn]) -> Result<(), RepositoryError> {
        self.conversations
            .entry(id.clone())
            .or_default()
            .extend_from_slice(turns);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConversationId>, RepositoryError> {
        let mut ids: Vec<ConversationId> =
            self.conversations.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}
