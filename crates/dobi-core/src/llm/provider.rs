//! LlmProvider trait definition.
//!
//! This is the core abstraction that all chat model backends implement.
//! Uses RPITIT for `complete`; the object-safe wrapper lives in
//! [`super::box_provider`].

use dobi_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (OpenAI and OpenAI-compatible servers).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in dobi-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
