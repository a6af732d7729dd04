//! Orchestrator -- the per-message answer pipeline.
//!
//! classify -> gather context -> render -> generate -> persist, strictly in
//! that order. Informational intents answer from documents alone with
//! `information_response`; everything else also pulls web search results and
//! answers with `default_chain`. Requests for the same conversation are
//! serialised by a per-conversation async lock.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{Span, debug, info, warn};

use dobi_types::chat::{ChatExchange, ConversationId};
use dobi_types::document::RetrievalMode;
use dobi_types::error::{ChatError, OrchestratorError, PromptError};
use dobi_types::intent::Intent;
use dobi_types::prompt::{ContextBag, PromptName, keys};

use crate::document::store::DocumentStore;
use crate::history::repository::HistoryRepository;
use crate::history::service::HistoryService;
use crate::intent::classifier::IntentClassifier;
use crate::llm::box_provider::BoxLlmProvider;
use crate::prompt::chain::{ChainParams, LlmChain};
use crate::prompt::registry::PromptRegistry;
use crate::search::BoxWebSearch;

use super::stage::Stage;

/// Shown to the user when a request fails for any reason.
pub const APOLOGY_TEXT: &str =
    "죄송합니다. 답변을 준비하는 중에 문제가 발생했습니다. 잠시 후 다시 시도해 주세요.";

/// Separator placed between retrieved chunks in the prompt.
const DOCUMENT_SEPARATOR: &str = "\n\n";

const BASE_KEYS: [&str; 4] = [
    keys::USER_MESSAGE,
    keys::INPUT,
    keys::INTENT_LIST,
    keys::CHAT_HISTORY,
];

/// Every context key present in the bag when `name` is rendered.
pub fn supplied_keys(name: PromptName) -> Vec<&'static str> {
    let extra: &[&'static str] = match name {
        PromptName::ParseIntent => &[],
        PromptName::InformationResponse => &[keys::RELATED_DOCUMENTS],
        PromptName::DefaultChain => &[keys::RELATED_DOCUMENTS, keys::COMPRESSED_WEB_SEARCH_RESULTS],
        PromptName::SearchValueCheck | PromptName::SearchCompression => {
            &[keys::RELATED_DOCUMENTS, keys::RELATED_WEB_SEARCH_RESULTS]
        }
    };
    BASE_KEYS.iter().chain(extra).copied().collect()
}

/// Reject templates that reference a key their chain never supplies.
fn check_placeholders(registry: &PromptRegistry) -> Result<(), PromptError> {
    for name in PromptName::ALL {
        let supplied = supplied_keys(name);
        let template = registry.get(name)?;
        if let Some(missing) = template
            .placeholders()
            .into_iter()
            .find(|p| !supplied.iter().any(|key| key == p))
        {
            return Err(PromptError::MissingPlaceholder {
                template: name.as_str().to_string(),
                placeholder: missing.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub top_k: usize,
    pub retrieval_mode: RetrievalMode,
    /// Check and compress web results with the model before use.
    pub refine_search: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            retrieval_mode: RetrievalMode::Similarity,
            refine_search: false,
        }
    }
}

/// Result of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub intent: Intent,
}

/// Generic over `HistoryRepository` so dobi-core never depends on dobi-infra.
pub struct Orchestrator<H: HistoryRepository> {
    registry: PromptRegistry,
    classifier: IntentClassifier,
    information_chain: LlmChain,
    default_chain: LlmChain,
    value_check_chain: LlmChain,
    compression_chain: LlmChain,
    documents: Arc<DocumentStore>,
    search: Arc<BoxWebSearch>,
    history: HistoryService<H>,
    settings: OrchestratorSettings,
    locks: DashMap<ConversationId, Arc<Mutex<()>>>,
}

impl<H: HistoryRepository> Orchestrator<H> {
    pub fn new(
        registry: PromptRegistry,
        provider: Arc<BoxLlmProvider>,
        params: ChainParams,
        documents: Arc<DocumentStore>,
        search: Arc<BoxWebSearch>,
        history: HistoryService<H>,
        settings: OrchestratorSettings,
    ) -> Result<Self, PromptError> {
        check_placeholders(&registry)?;
        let chain = |name: PromptName| -> Result<LlmChain, PromptError> {
            Ok(LlmChain::new(
                registry.get(name)?,
                Arc::clone(&provider),
                params.clone(),
            ))
        };

        Ok(Self {
            classifier: IntentClassifier::new(chain(PromptName::ParseIntent)?),
            information_chain: chain(PromptName::InformationResponse)?,
            default_chain: chain(PromptName::DefaultChain)?,
            value_check_chain: chain(PromptName::SearchValueCheck)?,
            compression_chain: chain(PromptName::SearchCompression)?,
            registry,
            documents,
            search,
            history,
            settings,
            locks: DashMap::new(),
        })
    }

    pub fn history(&self) -> &HistoryService<H> {
        &self.history
    }

    pub fn documents(&self) -> &Arc<DocumentStore> {
        &self.documents
    }

    fn lease<'a>(&'a self, id: &'a ConversationId) -> LockLease<'a> {
        let lock = Arc::clone(self.locks.entry(id.clone()).or_default().value());
        LockLease {
            locks: &self.locks,
            id,
            lock,
        }
    }

    /// Answer one message and persist the exchange.
    ///
    /// History is only appended once the answer exists, so any error leaves
    /// the conversation unchanged.
    #[tracing::instrument(
        skip(self, text),
        fields(conversation_id = %id, stage = tracing::field::Empty, intent = tracing::field::Empty)
    )]
    pub async fn generate_answer(
        &self,
        id: &ConversationId,
        text: &str,
    ) -> Result<Answer, OrchestratorError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage.into());
        }

        let lease = self.lease(id);
        let _guard = lease.lock.lock().await;
        self.answer_locked(id, text).await
    }

    /// The pipeline body; the caller holds the conversation lock.
    async fn answer_locked(
        &self,
        id: &ConversationId,
        text: &str,
    ) -> Result<Answer, OrchestratorError> {
        let conversation = self.history.load(id).await?;
        let chat_history = self.history.render_history_text(&conversation);

        let mut bag = ContextBag::new()
            .with(keys::USER_MESSAGE, text)
            .with(keys::INPUT, text)
            .with(keys::INTENT_LIST, self.registry.intent_list())
            .with(keys::CHAT_HISTORY, chat_history);

        let intent = self.classifier.classify_bag(&bag).await?;
        let span = Span::current();
        span.record("intent", intent.label());
        advance(&span, Stage::Classified);

        let related = self
            .documents
            .query_with_mode(text, self.settings.top_k, self.settings.retrieval_mode)
            .await?;
        debug!(chunks = related.len(), "related documents retrieved");
        bag.insert(keys::RELATED_DOCUMENTS, related.join(DOCUMENT_SEPARATOR));

        let chain = if intent.is_informational() {
            &self.information_chain
        } else {
            let web = self.web_context(&bag).await?;
            bag.insert(keys::COMPRESSED_WEB_SEARCH_RESULTS, web);
            &self.default_chain
        };
        advance(&span, Stage::ContextGathered);

        let prompt = chain.render(&bag)?;
        advance(&span, Stage::Rendered);

        let answer = chain.generate(prompt).await?;

        self.history.append_exchange(id, text, answer.as_str()).await?;
        advance(&span, Stage::Answered);

        info!(intent = %intent, chain = %chain.name(), "answer generated");
        Ok(Answer {
            text: answer,
            intent,
        })
    }

    /// Raw search results, optionally checked and compressed by the model.
    async fn web_context(&self, bag: &ContextBag) -> Result<String, OrchestratorError> {
        let query = bag.get(keys::INPUT).unwrap_or_default();
        let raw = self.search.search(query).await?;
        debug!(provider = %self.search.name(), chars = raw.len(), "web search finished");

        if !self.settings.refine_search || raw.trim().is_empty() {
            return Ok(raw);
        }

        let mut refine_bag = bag.clone();
        refine_bag.insert(keys::RELATED_WEB_SEARCH_RESULTS, raw);

        let verdict = self.value_check_chain.run(&refine_bag).await?;
        if verdict.trim().to_uppercase().starts_with('Y') {
            self.compression_chain.run(&refine_bag).await
        } else {
            debug!(verdict = %verdict, "web results judged not useful");
            Ok(String::new())
        }
    }

    /// UI boundary: never fails. Errors become a failed exchange carrying
    /// an apology; history is left untouched in that case.
    pub async fn submit(&self, id: ConversationId, text: String) -> ChatExchange {
        match self.generate_answer(&id, &text).await {
            Ok(answer) => ChatExchange {
                conversation_id: id,
                original_text: text,
                answer_text: answer.text,
                intent: Some(answer.intent),
                created_at: Utc::now(),
                failed: false,
            },
            Err(e) => {
                warn!(conversation_id = %id, error = %e, "request failed");
                ChatExchange {
                    conversation_id: id,
                    original_text: text,
                    answer_text: APOLOGY_TEXT.to_string(),
                    intent: None,
                    created_at: Utc::now(),
                    failed: true,
                }
            }
        }
    }
}

/// A request's claim on its conversation lock.
///
/// Dropping the last lease removes the map entry, including when the
/// request future is cancelled.
struct LockLease<'a> {
    locks: &'a DashMap<ConversationId, Arc<Mutex<()>>>,
    id: &'a ConversationId,
    lock: Arc<Mutex<()>>,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        // One reference in the map, one in this lease.
        self.locks.remove_if(self.id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

fn advance(span: &Span, stage: Stage) {
    span.record("stage", tracing::field::display(stage));
    debug!(stage = %stage, "stage reached");
}
