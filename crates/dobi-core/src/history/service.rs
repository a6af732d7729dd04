//! History service: conversation loading, turn appends, and prompt rendering.
//!
//! Storage is append-only and unbounded; `window_turns` only limits how many
//! recent turns are rendered into a prompt.

use tracing::debug;

use dobi_types::chat::{Conversation, ConversationId, Turn};
use dobi_types::error::RepositoryError;

use super::repository::HistoryRepository;

/// Generic over `HistoryRepository` so dobi-core never depends on dobi-infra.
pub struct HistoryService<H: HistoryRepository> {
    repo: H,
    window_turns: usize,
}

impl<H: HistoryRepository> HistoryService<H> {
    /// `window_turns = 0` renders the whole conversation.
    pub fn new(repo: H, window_turns: usize) -> Self {
        Self { repo, window_turns }
    }

    /// Load a conversation; an unknown id yields an empty conversation.
    pub async fn load(&self, id: &ConversationId) -> Result<Conversation, RepositoryError> {
        let turns = self.repo.load(id).await?;
        Ok(Conversation {
            id: id.clone(),
            turns,
        })
    }

    pub async fn append_user(
        &self,
        id: &ConversationId,
        text: impl Into<String>,
    ) -> Result<Turn, RepositoryError> {
        let turn = Turn::user(text);
        self.repo.append(id, std::slice::from_ref(&turn)).await?;
        debug!(conversation_id = %id, role = %turn.role, "turn appended");
        Ok(turn)
    }

    pub async fn append_assistant(
        &self,
        id: &ConversationId,
        text: impl Into<String>,
    ) -> Result<Turn, RepositoryError> {
        let turn = Turn::assistant(text);
        self.repo.append(id, std::slice::from_ref(&turn)).await?;
        debug!(conversation_id = %id, role = %turn.role, "turn appended");
        Ok(turn)
    }

    /// Append a question and its answer as one write.
    ///
    /// A failure leaves the conversation without either turn.
    pub async fn append_exchange(
        &self,
        id: &ConversationId,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<(), RepositoryError> {
        let turns = [Turn::user(question), Turn::assistant(answer)];
        self.repo.append(id, &turns).await?;
        debug!(conversation_id = %id, "exchange appended");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<ConversationId>, RepositoryError> {
        self.repo.list().await
    }

    /// Render `Human: ...` / `AI: ...` lines for the most recent turns.
    pub fn render_history_text(&self, conversation: &Conversation) -> String {
        render_turns(&conversation.turns, self.window_turns)
    }
}

/// Render turns as prompt lines, keeping only the last `window` (0 = all).
pub fn render_turns(turns: &[Turn], window: usize) -> String {
    let start = if window == 0 {
        0
    } else {
        turns.len().saturating_sub(window)
    };
    turns[start..]
        .iter()
        .map(|t| format!("{}: {}", t.role.prefix(), t.text))
        .collect::<Vec<_>>()
        .join("\n")
}
