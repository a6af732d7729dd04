//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/conversations",
            get(handlers::conversation::list_conversations),
        )
        .route(
            "/conversations/{id}/messages",
            post(handlers::conversation::post_message).get(handlers::conversation::get_messages),
        )
        .route("/documents/load", post(handlers::document::load_documents))
        .route("/documents/search", get(handlers::document::search_documents));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use dobi_core::document::box_embedder::BoxEmbedder;
    use dobi_core::document::chunker::FixedWindowChunker;
    use dobi_core::document::embedder::Embedder;
    use dobi_core::document::index::BoxDocumentIndex;
    use dobi_core::document::memory_index::InMemoryDocumentIndex;
    use dobi_core::document::store::DocumentStore;
    use dobi_core::history::service::HistoryService;
    use dobi_core::llm::box_provider::BoxLlmProvider;
    use dobi_core::llm::provider::LlmProvider;
    use dobi_core::orchestrator::Orchestrator;
    use dobi_core::prompt::registry::PromptRegistry;
    use dobi_core::search::{BoxWebSearch, DisabledSearch};
    use dobi_infra::history::file::FileHistoryRepository;
    use dobi_types::config::DobiConfig;
    use dobi_types::error::DocumentError;
    use dobi_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
    use dobi_types::prompt::PromptName;

    use super::*;
    use crate::state::{chain_params, orchestrator_settings};

    struct CannedProvider {
        fail: bool,
    }

    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
            if self.fail {
                return Err(LlmError::Provider {
                    message: "model unavailable".to_string(),
                });
            }
            let content = if request.prompt.starts_with("[parse_intent]") {
                "kakao_sync"
            } else {
                "환불은 결제 후 7일 이내에 가능합니다."
            };
            Ok(CompletionResponse {
                id: "resp-1".to_string(),
                content: content.to_string(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    struct CharEmbedder;

    impl Embedder for CharEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocumentError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0_f32; 32];
                    for c in t.chars().filter(|c| !c.is_whitespace()) {
                        v[c as usize % 32] += 1.0;
                    }
                    v
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "char-test"
        }

        fn dimension(&self) -> usize {
            32
        }
    }

    fn registry() -> PromptRegistry {
        let sources: HashMap<PromptName, String> = PromptName::ALL
            .into_iter()
            .map(|name| {
                let text = match name {
                    PromptName::ParseIntent => "[parse_intent] {intent_list} {chat_history} {user_message}",
                    PromptName::InformationResponse => "[info] {related_documents} {chat_history} {input}",
                    PromptName::DefaultChain => {
                        "[default] {related_documents} {compressed_web_search_results} {chat_history} {input}"
                    }
                    PromptName::SearchValueCheck => "[check] {related_web_search_results} {input}",
                    PromptName::SearchCompression => "[compress] {related_web_search_results} {input}",
                };
                (name, text.to_string())
            })
            .collect();
        PromptRegistry::from_sources(sources, "kakao_sync: 카카오싱크").unwrap()
    }

    fn make_app(dir: &std::path::Path, fail: bool) -> Router {
        let mut config = DobiConfig::default();
        config.documents.data_dir = dir.join("datas");
        config.history.dir = dir.join("chat_history");

        let documents = Arc::new(DocumentStore::new(
            Arc::new(BoxEmbedder::new(CharEmbedder)),
            Arc::new(BoxDocumentIndex::new(InMemoryDocumentIndex::new())),
            Arc::new(FixedWindowChunker::new(200, 20).unwrap()),
            config.documents.extensions.clone(),
            "ka-bot",
        ));
        let provider = BoxLlmProvider::new(CannedProvider { fail });
        let orchestrator = Orchestrator::new(
            registry(),
            Arc::new(provider),
            chain_params(&config),
            documents,
            Arc::new(BoxWebSearch::new(DisabledSearch)),
            HistoryService::new(
                FileHistoryRepository::new(&config.history.dir),
                config.history.window_turns,
            ),
            orchestrator_settings(&config),
        )
        .unwrap();

        build_router(AppState::from_parts(Arc::new(orchestrator), config))
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = tempfile::tempdir().unwrap();
        let response = make_app(tmp.path(), false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_post_message_then_read_history() {
        let tmp = tempfile::tempdir().unwrap();
        let app = make_app(tmp.path(), false);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/conversations/fa1010/messages",
                r#"{"text":"환불 정책이 뭐야?"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["conversation_id"], "fa1010");
        assert_eq!(json["data"]["intent"], "kakao_sync");
        assert_eq!(json["data"]["failed"], false);
        assert!(json["meta"]["request_id"].is_string());

        let response = app
            .oneshot(
                Request::get("/api/v1/conversations/fa1010/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        let turns = json["data"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_model_failure_returns_failed_exchange() {
        let tmp = tempfile::tempdir().unwrap();
        let app = make_app(tmp.path(), true);

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/conversations/c1/messages", r#"{"text":"안녕"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["failed"], true);

        let response = app
            .oneshot(Request::get("/api/v1/conversations/c1/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_conversation_id_is_bad_request() {
        let tmp = tempfile::tempdir().unwrap();
        let response = make_app(tmp.path(), false)
            .oneshot(post_json("/api/v1/conversations/has.dot/messages", r#"{"text":"x"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let tmp = tempfile::tempdir().unwrap();
        let response = make_app(tmp.path(), false)
            .oneshot(post_json("/api/v1/conversations/c1/messages", r#"{"text":"   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_load_then_search_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("datas");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("sync.txt"), "카카오싱크 환불 정책은 7일 이내입니다.").unwrap();
        std::fs::write(data.join("slides.pdf"), "binary").unwrap();
        let app = make_app(tmp.path(), false);

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/documents/load", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["loaded"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["failed"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(
                Request::get("/api/v1/documents/search?q=%ED%99%98%EB%B6%88&k=1&mode=retriever")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let texts = json["data"].as_array().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].as_str().unwrap().contains("환불"));
    }

    #[tokio::test]
    async fn test_load_missing_data_dir_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let response = make_app(tmp.path(), false)
            .oneshot(post_json("/api/v1/documents/load", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_load_subdirectory_of_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("datas").join("sync");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("guide.md"), "# 카카오싱크 도입 절차").unwrap();
        std::fs::write(tmp.path().join("datas").join("other.txt"), "다른 문서").unwrap();
        let app = make_app(tmp.path(), false);

        let response = app
            .clone()
            .oneshot(post_json("/api/v1/documents/load", r#"{"directory":"sync"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["loaded"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(post_json("/api/v1/documents/load", r#"{"directory":"missing"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_load_outside_data_dir_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("datas")).unwrap();
        let secrets = tmp.path().join("private");
        std::fs::create_dir_all(&secrets).unwrap();
        std::fs::write(secrets.join("notes.txt"), "do not index").unwrap();
        let app = make_app(tmp.path(), false);

        let absolute = serde_json::json!({ "directory": secrets }).to_string();
        for body in [absolute.as_str(), r#"{"directory":"../private"}"#] {
            let response = app
                .clone()
                .oneshot(post_json("/api/v1/documents/load", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let json = body_json(response).await;
            assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_search_rejects_unknown_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let response = make_app(tmp.path(), false)
            .oneshot(
                Request::get("/api/v1/documents/search?q=abc&mode=nearest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
