//! HistoryRepository trait definition.
//!
//! Append-only persistence of conversation turns. Follows the same RPITIT
//! pattern as the other repository traits.

use dobi_types::chat::{ConversationId, Turn};
use dobi_types::error::RepositoryError;

/// Repository trait for conversation turn persistence.
///
/// Implementations live in dobi-infra (e.g., `FileHistoryRepository`).
pub trait HistoryRepository: Send + Sync {
    /// All turns of a conversation in append order. Empty if it does not exist.
    fn load(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Append turns to the end of a conversation, creating it if needed.
    ///
    /// All of `turns` are written or none are.
    fn append(
        &self,
        id: &ConversationId,
        turns: &[Turn],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Identifiers of every stored conversation, sorted.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationId>, RepositoryError>> + Send;
}
