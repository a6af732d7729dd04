use thiserror::Error;

use crate::llm::LlmError;

/// Errors related to chat input validation.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid conversation id: '{0}'")]
    InvalidConversationId(String),

    #[error("message text is empty")]
    EmptyMessage,
}

/// Errors from loading, splitting, embedding, or indexing documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("not supported file type: '{0}'")]
    UnsupportedFileType(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("file is not valid utf-8")]
    InvalidUtf8,

    #[error("malformed notebook: {0}")]
    MalformedNotebook(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("index error: {0}")]
    Index(String),

    #[error("invalid chunk config: size {size}, overlap {overlap}")]
    InvalidChunkConfig { size: usize, overlap: usize },
}

/// Errors from parsing, loading, or rendering prompt templates.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template '{template}' references '{placeholder}' which is not in the context")]
    MissingPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("malformed template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Errors from the web search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("search response could not be decoded: {0}")]
    Deserialization(String),
}

/// Errors from repository operations (used by trait definitions in dobi-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(String),
}

/// Startup failures caused by missing credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("missing credential: environment variable {0} is not set")]
    Missing(String),
}

/// Errors raised while answering a single request.
///
/// Collaborator failures (model, embeddings, index, search) are folded into
/// `ExternalService` with the service name so callers can report which hop
/// failed without depending on every collaborator's error type.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("{service} failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("history error: {0}")]
    History(#[from] RepositoryError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl OrchestratorError {
    pub fn external(service: impl Into<String>, message: impl ToString) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

impl From<LlmError> for OrchestratorError {
    fn from(err: LlmError) -> Self {
        Self::external("llm", err)
    }
}

impl From<SearchError> for OrchestratorError {
    fn from(err: SearchError) -> Self {
        Self::external("search", err)
    }
}

impl From<DocumentError> for OrchestratorError {
    fn from(err: DocumentError) -> Self {
        Self::external("documents", err)
    }
}
