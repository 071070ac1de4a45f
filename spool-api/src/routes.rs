//! Route definitions for the Spool API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use spool_common::Error;
use spool_core::{ReplyOrchestrator, Thread, ThreadIndex, ThreadToken};

use crate::identity::Identity;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ReplyOrchestrator>,
    pub index: Arc<ThreadIndex>,
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub token: String,
    pub message: String,
}

/// Chat response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub title: String,
    pub created: bool,
}

/// Thread summary as exposed to clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadSummaryResponse {
    pub token: String,
    pub title: String,
}

/// List response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadSummaryResponse>,
}

/// Full-thread response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadResponse {
    pub thread: Thread,
}

/// Delete response.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn into_api_error(err: Error) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().to_string(),
        }),
    )
}

/// Build the complete router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/threads", get(list_threads_handler))
        .route(
            "/api/threads/:token",
            get(get_thread_handler).delete(delete_thread_handler),
        )
        .with_state(state)
        .route("/health", get(health_handler))
}

async fn chat_handler(
    State(state): State<AppState>,
    Identity(owner): Identity,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .submit(&request.token, &owner, &request.message)
        .await
        .map_err(|e| {
            tracing::warn!(owner = %owner, error = %e, "Chat submit failed");
            into_api_error(e)
        })?;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        title: outcome.title,
        created: outcome.created,
    }))
}

async fn list_threads_handler(
    State(state): State<AppState>,
    Identity(owner): Identity,
) -> Result<Json<ListThreadsResponse>, ApiError> {
    let summaries = state.index.list(&owner).await.map_err(into_api_error)?;

    Ok(Json(ListThreadsResponse {
        threads: summaries
            .into_iter()
            .map(|s| ThreadSummaryResponse {
                token: s.token.as_str().to_string(),
                title: s.title,
            })
            .collect(),
    }))
}

async fn get_thread_handler(
    State(state): State<AppState>,
    Identity(owner): Identity,
    Path(token): Path<String>,
) -> Result<Json<ThreadResponse>, ApiError> {
    let token = ThreadToken::parse(&token).map_err(into_api_error)?;
    let thread = state
        .index
        .get(&token, &owner)
        .await
        .map_err(into_api_error)?;

    Ok(Json(ThreadResponse { thread }))
}

async fn delete_thread_handler(
    State(state): State<AppState>,
    Identity(owner): Identity,
    Path(token): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let token = ThreadToken::parse(&token).map_err(into_api_error)?;
    state
        .index
        .delete(&token, &owner)
        .await
        .map_err(into_api_error)?;

    tracing::info!(%token, %owner, "Thread deleted");
    Ok(Json(DeleteResponse { deleted: true }))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        service: "spool-api".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::OWNER_HEADER;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use spool_common::Result;
    use spool_core::{Generator, MemoryThreadStore, PromptMessage, TitleGenerator};
    use tower::ServiceExt;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, context: &[PromptMessage]) -> Result<String> {
            let last = context.last().expect("non-empty context");
            if last.content.starts_with("Generate ONE concise") {
                Ok("Test Title".to_string())
            } else {
                Ok(format!("Echo: {}", last.content))
            }
        }
    }

    fn test_router() -> Router {
        let store = Arc::new(MemoryThreadStore::new());
        let index = Arc::new(ThreadIndex::new(store.clone()));
        let generator: Arc<dyn Generator> = Arc::new(EchoGenerator);
        let titler = TitleGenerator::new(generator.clone());
        let orchestrator = Arc::new(ReplyOrchestrator::new(
            store,
            index.clone(),
            generator,
            titler,
            10,
        ));
        build_router(AppState {
            orchestrator,
            index,
        })
    }

    const TOKEN: &str = "11111111-2222-3333-4444-555555555555";

    fn chat_request(owner: &str, token: &str, message: &str) -> Request<Body> {
        Request::post("/api/chat")
            .header(OWNER_HEADER, owner)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "token": token, "message": message }).to_string(),
            ))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn chat_creates_thread_and_returns_reply() {
        let app = test_router();

        let response = app
            .oneshot(chat_request("u1", TOKEN, "Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ChatResponse = json_body(response).await;
        assert_eq!(body.reply, "Echo: Hi");
        assert_eq!(body.title, "Test Title");
        assert!(body.created);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let app = test_router();

        let request = Request::post("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "token": TOKEN, "message": "Hi" }).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.code, "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn empty_message_is_a_bad_request() {
        let app = test_router();

        let response = app
            .oneshot(chat_request("u1", TOKEN, "  "))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.code, "INVALID_INPUT");
    }

    #[tokio::test]
    async fn malformed_token_is_a_bad_request() {
        let app = test_router();

        let response = app
            .oneshot(chat_request("u1", "bad token!", "Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn threads_listing_reflects_chats() {
        let app = test_router();

        app.clone()
            .oneshot(chat_request("u1", TOKEN, "Hi"))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::get("/api/threads")
                    .header(OWNER_HEADER, "u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ListThreadsResponse = json_body(response).await;
        assert_eq!(body.threads.len(), 1);
        assert_eq!(body.threads[0].token, TOKEN);
        assert_eq!(body.threads[0].title, "Test Title");
    }

    #[tokio::test]
    async fn get_thread_returns_messages_in_order() {
        let app = test_router();

        app.clone()
            .oneshot(chat_request("u1", TOKEN, "Hi"))
            .await
            .unwrap();
        app.clone()
            .oneshot(chat_request("u1", TOKEN, "What is 2+2?"))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::get(format!("/api/threads/{TOKEN}"))
                    .header(OWNER_HEADER, "u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ThreadResponse = json_body(response).await;
        let contents: Vec<&str> = body
            .thread
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["Hi", "Echo: Hi", "What is 2+2?", "Echo: What is 2+2?"]
        );
    }

    #[tokio::test]
    async fn thread_is_scoped_to_its_owner() {
        let app = test_router();

        app.clone()
            .oneshot(chat_request("u1", TOKEN, "Hi"))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::get(format!("/api/threads/{TOKEN}"))
                    .header(OWNER_HEADER, "u2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let app = test_router();

        app.clone()
            .oneshot(chat_request("u1", TOKEN, "Hi"))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/threads/{TOKEN}"))
                    .header(OWNER_HEADER, "u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: DeleteResponse = json_body(response).await;
        assert!(body.deleted);

        let response = app
            .oneshot(
                Request::get(format!("/api/threads/{TOKEN}"))
                    .header(OWNER_HEADER, "u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_router();

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: HealthResponse = json_body(response).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.service, "spool-api");
    }
}
