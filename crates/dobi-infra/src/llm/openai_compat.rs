//! OpenAI-compatible chat completion provider.
//!
//! Uses [`async_openai`] for type-safe request/response handling. Any
//! server speaking the OpenAI chat completions protocol works by pointing
//! `base_url` at it.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use dobi_core::llm::provider::LlmProvider;
use dobi_observe::genai_attrs;
use dobi_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

/// Configuration for an [`OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Default model when a request leaves `model` empty.
    pub model: String,
}

/// Provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
        }
    }

    /// Translate a [`CompletionRequest`] into one user message.
    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest("prompt is empty".to_string()));
        }

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        Ok(CreateChatCompletionRequest {
            model,
            messages: vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(request.prompt.clone()),
                    name: None,
                },
            )],
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        })
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request)?;

        let span = tracing::info_span!(
            "chat",
            gen_ai.operation.name = genai_attrs::OP_CHAT,
            gen_ai.provider.name = %self.provider_name,
            gen_ai.request.model = %oai_request.model,
            gen_ai.response.id = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        let response = self
            .client
            .chat()
            .create(oai_request)
            .instrument(span.clone())
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let stop_reason = response
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .map(|fr| match fr {
                FinishReason::Stop => StopReason::EndTurn,
                FinishReason::Length => StopReason::MaxTokens,
                FinishReason::ContentFilter => StopReason::ContentFilter,
                FinishReason::ToolCalls | FinishReason::FunctionCall => StopReason::EndTurn,
            })
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        span.record(genai_attrs::GEN_AI_RESPONSE_ID, response.id.as_str());
        span.record(
            genai_attrs::GEN_AI_RESPONSE_FINISH_REASONS,
            tracing::field::debug(&stop_reason),
        );
        span.record(genai_attrs::GEN_AI_USAGE_INPUT_TOKENS, usage.input_tokens);
        span.record(genai_attrs::GEN_AI_USAGE_OUTPUT_TOKENS, usage.output_tokens);

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "context_length_exceeded"
                || api_err.message.contains("maximum context length")
            {
                LlmError::ContextLengthExceeded {
                    max: 0,
                    requested: 0,
                }
            } else if code == "server_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            Some(503) => LlmError::Overloaded(err.to_string()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(OpenAiCompatConfig {
            provider_name: "openai".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: SecretString::from("sk-test".to_string()),
            model: "gpt-3.5-turbo".to_string(),
        })
    }

    fn request(model: &str, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            max_tokens: 200,
            temperature: Some(0.1),
        }
    }

    #[test]
    fn test_build_request_single_user_message() {
        let oai_req = provider()
            .build_request(&request("gpt-4o-mini", "환불 정책이 뭐야?"))
            .unwrap();
        assert_eq!(oai_req.model, "gpt-4o-mini");
        assert_eq!(oai_req.messages.len(), 1);
        assert!(matches!(
            &oai_req.messages[0],
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(text),
                ..
            }) if text == "환불 정책이 뭐야?"
        ));
        assert_eq!(oai_req.max_completion_tokens, Some(200));
        assert!(oai_req.stream.is_none());
        assert!(oai_req.stop.is_none());
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let oai_req = provider().build_request(&request("", "hi")).unwrap();
        assert_eq!(oai_req.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_build_request_blank_prompt_is_invalid() {
        assert!(matches!(
            provider().build_request(&request("", "  \n")),
            Err(LlmError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invalid_argument_maps_to_invalid_request() {
        let err = map_openai_error(async_openai::error::OpenAIError::InvalidArgument(
            "bad temperature".to_string(),
        ));
        assert!(matches!(err, LlmError::InvalidRequest(msg) if msg == "bad temperature"));
    }
}
