//! LLM provider implementations and the provider factory.

pub mod openai_compat;

use secrecy::SecretString;

use dobi_core::llm::box_provider::BoxLlmProvider;
use dobi_types::config::LlmConfig;

use self::openai_compat::{OpenAiCompatConfig, OpenAiCompatibleProvider};

/// Build the chat model provider described by `[llm]`.
///
/// Every supported backend speaks the OpenAI protocol, so `provider` only
/// labels logs and spans while `base_url` selects the server.
pub fn create_provider(config: &LlmConfig, api_key: SecretString) -> BoxLlmProvider {
    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig {
        provider_name: config.provider.clone(),
        base_url: config.base_url.clone(),
        api_key,
        model: config.model.clone(),
    });
    tracing::debug!(
        provider = %config.provider,
        model = %config.model,
        base_url = %config.base_url,
        "llm provider created"
    );
    BoxLlmProvider::new(provider)
}
