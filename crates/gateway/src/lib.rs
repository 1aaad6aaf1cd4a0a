//! HTTP API gateway for Askbase.
//!
//! Endpoints:
//!
//! - `POST   /v1/chat`                       — Send a query, get a complete answer
//! - `POST   /v1/chat/stream`                — Send a query, get an SSE stream
//! - `GET    /v1/knowledge`                  — List knowledge bases
//! - `POST   /v1/knowledge`                  — Create a knowledge base
//! - `DELETE /v1/knowledge/{name}`           — Delete a knowledge base
//! - `GET    /v1/knowledge/{name}/info`      — Knowledge base summary
//! - `POST   /v1/knowledge/{name}/documents` — Index texts into a knowledge base
//! - `POST   /v1/knowledge/{name}/search`    — Similarity search
//! - `GET    /health`                        — Liveness check
//!
//! Built on Axum for high performance async HTTP.

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::info;

use askbase_chat::{ChatCompletion, ChatOptions, ChatService};
use askbase_core::message::Message;
use askbase_core::retrieval::{CollectionInfo, KnowledgeStore, Snippet};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiState {
    pub chat: ChatService,
    pub knowledge: Arc<dyn KnowledgeStore>,
}

pub type SharedApiState = Arc<ApiState>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat/stream", post(chat_stream_handler))
        .route(
            "/knowledge",
            get(list_knowledge_handler).post(create_knowledge_handler),
        )
        .route("/knowledge/{name}", delete(delete_knowledge_handler))
        .route("/knowledge/{name}/info", get(knowledge_info_handler))
        .route("/knowledge/{name}/documents", post(add_documents_handler))
        .route("/knowledge/{name}/search", post(search_handler))
        .with_state(state)
}

/// Build the full router including health check and middleware layers.
pub fn build_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1_router(state))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: askbase_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let gateway = Arc::new(askbase_providers::OpenAiCompatGateway::new(
        "openai",
        &config.base_url,
        config.api_key.clone().unwrap_or_default(),
    )?);

    let knowledge: Arc<dyn KnowledgeStore> = Arc::new(
        askbase_knowledge::VectorKnowledgeStore::new(gateway.clone(), &config.embedding_model),
    );

    let chat = ChatService::new(
        gateway,
        knowledge.clone(),
        &config.model,
        ChatOptions {
            history_max_turns: config.chat.history_max_turns,
            temperature: config.chat.temperature,
            max_tokens: config.chat.max_tokens,
            retrieval_k: config.chat.retrieval_k,
        },
    );

    let state = Arc::new(ApiState { chat, knowledge });
    let router = build_router(state);

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatRequest {
    /// The user's query.
    #[serde(default)]
    query: String,
    /// Prior turns, oldest first. Callers own durable history.
    #[serde(default)]
    history: Vec<Message>,
    /// Knowledge base to retrieve context from.
    #[serde(default)]
    knowledge_base: Option<String>,
}

#[derive(Deserialize)]
struct CreateKnowledgeRequest {
    name: String,
}

#[derive(Serialize, Deserialize)]
struct CreateKnowledgeResponse {
    created: bool,
}

#[derive(Serialize, Deserialize)]
struct KnowledgeBaseSummary {
    name: String,
}

#[derive(Serialize, Deserialize)]
struct DeleteKnowledgeResponse {
    deleted: bool,
}

#[derive(Deserialize)]
struct AddDocumentsRequest {
    texts: Vec<String>,
    #[serde(default)]
    metadatas: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Serialize, Deserialize)]
struct AddDocumentsResponse {
    added: bool,
    count: usize,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_k")]
    k: usize,
}

fn default_k() -> usize {
    4
}

#[derive(Serialize, Deserialize)]
struct SearchResponse {
    snippets: Vec<Snippet>,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn bad_gateway(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn not_found(message: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /v1/chat` — Send a query, receive the complete answer.
async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatCompletion>, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(bad_request("Query is required"));
    }

    info!(
        knowledge_base = payload.knowledge_base.as_deref().unwrap_or("-"),
        "v1/chat request"
    );

    let result = state
        .chat
        .complete_once(
            &payload.query,
            &payload.history,
            payload.knowledge_base.as_deref(),
        )
        .await
        .map_err(|e| bad_gateway(e.to_string()))?;

    Ok(Json(result))
}

/// `POST /v1/chat/stream` — Send a query, receive an SSE stream of events.
///
/// Each SSE record carries one serialized `ChatStreamEvent`; the event name
/// is the event's type tag. The stream ends after the terminal event.
async fn chat_stream_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(bad_request("Query is required"));
    }

    info!(
        knowledge_base = payload.knowledge_base.as_deref().unwrap_or("-"),
        "v1/chat/stream SSE request"
    );

    let rx = state.chat.stream_chat(
        &payload.query,
        &payload.history,
        payload.knowledge_base.as_deref(),
    );

    let stream = ReceiverStream::new(rx).map(|event| {
        let event_type = event.event_type();
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok::<_, Infallible>(SseEvent::default().event(event_type).data(data))
    });

    // Intermediaries must not buffer or replay the event stream
    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(stream).keep_alive(KeepAlive::default()),
    ))
}

/// `GET /v1/knowledge` — List knowledge bases.
async fn list_knowledge_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<Vec<KnowledgeBaseSummary>>, ApiError> {
    let names = state
        .knowledge
        .list_collections()
        .await
        .map_err(|e| bad_gateway(e.to_string()))?;

    Ok(Json(
        names
            .into_iter()
            .map(|name| KnowledgeBaseSummary { name })
            .collect(),
    ))
}

/// `DELETE /v1/knowledge/{name}` — Delete a knowledge base.
async fn delete_knowledge_handler(
    State(state): State<SharedApiState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteKnowledgeResponse>, ApiError> {
    let deleted = state
        .knowledge
        .delete_collection(&name)
        .await
        .map_err(|e| bad_gateway(e.to_string()))?;

    if !deleted {
        return Err(not_found("Knowledge base not found"));
    }

    Ok(Json(DeleteKnowledgeResponse { deleted }))
}

/// `GET /v1/knowledge/{name}/info` — Knowledge base summary.
async fn knowledge_info_handler(
    State(state): State<SharedApiState>,
    Path(name): Path<String>,
) -> Result<Json<CollectionInfo>, ApiError> {
    let info = state
        .knowledge
        .collection_info(&name)
        .await
        .map_err(|e| bad_gateway(e.to_string()))?
        .ok_or_else(|| not_found("Knowledge base not found"))?;

    Ok(Json(info))
}

/// `POST /v1/knowledge` — Create a named knowledge base.
async fn create_knowledge_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<CreateKnowledgeRequest>,
) -> Result<Json<CreateKnowledgeResponse>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(bad_request("Knowledge base name is required"));
    }

    let created = state
        .knowledge
        .create_collection(&payload.name)
        .await
        .map_err(|e| bad_gateway(e.to_string()))?;

    Ok(Json(CreateKnowledgeResponse { created }))
}

/// `POST /v1/knowledge/{name}/documents` — Embed and index texts.
async fn add_documents_handler(
    State(state): State<SharedApiState>,
    Path(name): Path<String>,
    Json(payload): Json<AddDocumentsRequest>,
) -> Result<Json<AddDocumentsResponse>, ApiError> {
    if payload.texts.is_empty() {
        return Err(bad_request("At least one text is required"));
    }

    let count = payload.texts.len();
    let added = state
        .knowledge
        .add_texts(&name, payload.texts, payload.metadatas)
        .await
        .map_err(|e| bad_gateway(e.to_string()))?;

    Ok(Json(AddDocumentsResponse { added, count }))
}

/// `POST /v1/knowledge/{name}/search` — Similarity search over a knowledge base.
async fn search_handler(
    State(state): State<SharedApiState>,
    Path(name): Path<String>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(bad_request("Query is required"));
    }

    let snippets = state
        .knowledge
        .search(&name, &payload.query, payload.k)
        .await
        .map_err(|e| bad_gateway(e.to_string()))?;

    Ok(Json(SearchResponse { snippets }))
}

// ── Tests ─────────────────────────────────────────────────────────────────
