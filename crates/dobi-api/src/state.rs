//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! The orchestrator is generic over the history repository; AppState pins it
//! to the JSON-lines file store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use dobi_core::document::store::DocumentStore;
use dobi_core::history::service::HistoryService;
use dobi_core::orchestrator::{Orchestrator, OrchestratorSettings};
use dobi_core::prompt::chain::ChainParams;
use dobi_infra::config::{DOBI_HOME_ENV, load_config, resolve_config_path};
use dobi_infra::document::create_chunker;
use dobi_infra::embedding::create_embedder;
use dobi_infra::history::file::FileHistoryRepository;
use dobi_infra::llm::create_provider;
use dobi_infra::prompt::load_prompt_registry;
use dobi_infra::search::create_search;
use dobi_infra::secret::{EnvCredentials, OPENAI_API_KEY};
use dobi_infra::vector::create_index;
use dobi_types::config::{DobiConfig, EmbeddingBackend};

pub type ConcreteOrchestrator = Orchestrator<FileHistoryRepository>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub documents: Arc<DocumentStore>,
    pub config: Arc<DobiConfig>,
}

impl AppState {
    /// Load config, read credentials from the environment, and wire services.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let dobi_home = std::env::var_os(DOBI_HOME_ENV).map(PathBuf::from);
        let config_path = resolve_config_path(config_path, dobi_home.as_deref());
        let config = load_config(&config_path).await;

        let credentials = EnvCredentials::from_env();
        let llm_key = credentials.require(OPENAI_API_KEY)?;
        let embedding_key = match config.embedding.backend {
            EmbeddingBackend::OpenAi => Some(credentials.require(OPENAI_API_KEY)?),
            EmbeddingBackend::FastEmbed => None,
        };

        let provider = create_provider(&config.llm, llm_key);
        let embedder = create_embedder(&config.embedding, embedding_key)
            .await
            .context("Failed to initialize embedder")?;
        let index = create_index(&config.documents, embedder.dimension(), embedder.model_name())
            .await
            .context("Failed to open document index")?;
        let chunker = create_chunker(&config.documents)?;

        let documents = Arc::new(DocumentStore::new(
            Arc::new(embedder),
            Arc::new(index),
            chunker,
            config.documents.extensions.clone(),
            config.documents.collection.clone(),
        ));

        let search = create_search(&config.search, &credentials)?;
        let registry = load_prompt_registry(&config.prompts.dir)
            .await
            .with_context(|| format!("Failed to load templates from {}", config.prompts.dir.display()))?;
        let history = HistoryService::new(
            FileHistoryRepository::new(&config.history.dir),
            config.history.window_turns,
        );

        let orchestrator = Orchestrator::new(
            registry,
            Arc::new(provider),
            chain_params(&config),
            Arc::clone(&documents),
            Arc::new(search),
            history,
            orchestrator_settings(&config),
        )?;

        tracing::info!(
            config = %config_path.display(),
            model = %config.llm.model,
            collection = %config.documents.collection,
            "application state initialized"
        );

        Ok(Self::from_parts(Arc::new(orchestrator), config))
    }

    pub fn from_parts(orchestrator: Arc<ConcreteOrchestrator>, config: DobiConfig) -> Self {
        Self {
            documents: Arc::clone(orchestrator.documents()),
            orchestrator,
            config: Arc::new(config),
        }
    }
}

pub fn chain_params(config: &DobiConfig) -> ChainParams {
    ChainParams {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
    }
}

pub fn orchestrator_settings(config: &DobiConfig) -> OrchestratorSettings {
    OrchestratorSettings {
        top_k: config.documents.top_k,
        retrieval_mode: config.documents.retrieval_mode,
        refine_search: config.search.refine,
    }
}
