//! Hand-written test doubles shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dobi_types::error::{DocumentError, SearchError};
use dobi_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use dobi_types::prompt::PromptName;

use crate::document::embedder::Embedder;
use crate::llm::provider::LlmProvider;
use crate::prompt::registry::PromptRegistry;
use crate::search::WebSearch;

const DIM: usize = 64;

/// Deterministic embedder: a histogram of characters hashed into 64 buckets.
///
/// Texts sharing many characters land close together, which is enough to
/// make retrieval tests meaningful without a model.
pub struct HashingEmbedder;

impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocumentError> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0_f32; DIM];
                for c in t.chars().filter(|c| !c.is_whitespace()) {
                    v[c as usize % DIM] += 1.0;
                }
                v
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "hashing-test"
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// Embedder that always fails, for exercising error paths.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, DocumentError> {
        Err(DocumentError::Embedding("embedding service unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

/// LLM double that answers based on a marker found in the prompt.
///
/// Every prompt it receives is recorded so tests can assert on what the
/// model was actually shown.
pub struct ScriptedProvider {
    rules: Vec<(String, String)>,
    default: String,
    fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default: String::new(),
            fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Reply with `response` to any prompt containing `marker`.
    pub fn on(mut self, marker: &str, response: &str) -> Self {
        self.rules.push((marker.to_string(), response.to_string()));
        self
    }

    pub fn with_default(mut self, response: &str) -> Self {
        self.default = response.to_string();
        self
    }

    /// Shared handle to the recorded prompts.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if self.fail {
            return Err(LlmError::Provider {
                message: "model unavailable".to_string(),
            });
        }
        let prompt = request.prompt.clone();
        self.prompts
            .lock()
            .map_err(|_| LlmError::Provider {
                message: "poisoned".to_string(),
            })?
            .push(prompt.clone());

        let content = self
            .rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default.clone());

        Ok(CompletionResponse {
            id: "resp-scripted".to_string(),
            content,
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
            },
        })
    }
}

/// Search double returning a fixed result and counting calls.
pub struct RecordingSearch {
    result: Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl RecordingSearch {
    pub fn returning(result: &str) -> Self {
        Self {
            result: Ok(result.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err("search quota exceeded".to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl WebSearch for RecordingSearch {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(&self, _query: &str) -> Result<String, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(SearchError::Request)
    }
}

/// Registry whose templates start with a `[name]` marker.
pub fn test_registry() -> PromptRegistry {
    let sources: HashMap<PromptName, String> = [
        (
            PromptName::ParseIntent,
            "[parse_intent]\nintents: {intent_list}\nhistory: {chat_history}\nmessage: {user_message}",
        ),
        (
            PromptName::InformationResponse,
            "[information_response]\ndocs: {related_documents}\nhistory: {chat_history}\nquestion: {input}",
        ),
        (
            PromptName::DefaultChain,
            "[default_chain]\ndocs: {related_documents}\nweb: {compressed_web_search_results}\nhistory: {chat_history}\nquestion: {input}",
        ),
        (
            PromptName::SearchValueCheck,
            "[search_value_check]\n{related_web_search_results}\nquestion: {input}",
        ),
        (
            PromptName::SearchCompression,
            "[search_compression]\n{related_web_search_results}\nquestion: {input}",
        ),
    ]
    .into_iter()
    .map(|(name, text)| (name, text.to_string()))
    .collect();

    match PromptRegistry::from_sources(sources, "kakao_social: 카카오 소셜\nkakao_sync: 카카오싱크\nkakao_talk_channel: 카카오톡 채널") {
        Ok(registry) => registry,
        Err(e) => panic!("test registry is invalid: {e}"),
    }
}
