//! HTTP chat API.
//!
//! Thin glue over the retrieval engine: multipart parsing, session ids,
//! and reply formatting. All retrieval semantics live in the library
//! modules; nothing here scores or ranks anything.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/health` | Health check (returns version) |
//! | `POST` | `/api/chat` | Chat turn: optional uploads + optional question |
//! | `GET`  | `/api/sessions/{id}/files` | List a session's stored files |
//!
//! `POST /api/chat` accepts either `multipart/form-data` (fields
//! `message`, `session_id`, repeated `files`) or JSON
//! `{"message": "...", "session_id": "..."}`. A missing or empty
//! `session_id` starts a new session whose id is returned in the reply.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "unsupported_media", "message": "file type not allowed ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `unsupported_media` (415),
//! `internal` (500). Retrieval itself never errors — empty corpus and
//! empty query are reply modes, not failures.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted; the original browser
//! client posts from another origin.

use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::augment::{create_augmentor, Augmentor};
use crate::config::Config;
use crate::models::{SearchHit, SearchOutcome};
use crate::search::run_query;
use crate::store::{SessionStore, StoreError};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<SessionStore>,
    augmentor: Arc<dyn Augmentor>,
}

/// Start the HTTP server on the configured bind address.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let augmentor: Arc<dyn Augmentor> = Arc::from(create_augmentor(&config.augment)?);
    let state = AppState {
        store: Arc::new(SessionStore::new(config.store.upload_root.clone())),
        config: Arc::new(config.clone()),
        augmentor,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .route("/api/sessions/{id}/files", get(handle_list_files))
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(cors)
        .with_state(state);

    info!(bind = %bind_addr, "chat API listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn unsupported_media(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
        code: "unsupported_media".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Map store/extraction failures onto the error contract: whitelist
/// rejections become 415, everything else 500.
fn classify_store_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::DisallowedType(_)) | Some(StoreError::UnusableName(_)) => {
            unsupported_media(err.to_string())
        }
        None => internal(err.to_string()),
    }
}

// ============ GET /api/health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/sessions/{id}/files ============

#[derive(Serialize)]
struct FileEntry {
    name: String,
    modified_at: String,
}

#[derive(Serialize)]
struct FileListResponse {
    session_id: String,
    files: Vec<FileEntry>,
}

async fn handle_list_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FileListResponse>, AppError> {
    let files = state
        .store
        .list_files(&id)
        .map_err(|e| internal(e.to_string()))?;
    Ok(Json(FileListResponse {
        session_id: id,
        files: files
            .into_iter()
            .map(|f| FileEntry {
                name: f.name,
                modified_at: f.modified_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            })
            .collect(),
    }))
}

// ============ POST /api/chat ============

/// JSON request body (the multipart form carries the same fields).
#[derive(Deserialize, Default)]
struct ChatJsonBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    session_id: String,
}

/// One chat turn's reply.
#[derive(Serialize)]
struct ChatResponse {
    /// Session id, generated when the request did not carry one.
    session_id: String,
    /// Human-readable reply text.
    reply: String,
    /// Files saved by this request.
    used_files: Vec<String>,
    /// `status`, `doc_search`, `chat_fallback`, or `chat`.
    mode: String,
    /// Ranked hits backing a `doc_search` reply; empty otherwise.
    results: Vec<SearchHit>,
}

/// Parsed chat input, whichever wire shape it arrived in.
struct ChatInput {
    message: String,
    session_id: String,
    uploads: Vec<(String, Vec<u8>)>,
}

async fn handle_chat(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<ChatResponse>, AppError> {
    let input = read_chat_input(req).await?;

    let session_id = if input.session_id.trim().is_empty() {
        uuid::Uuid::new_v4().simple().to_string()
    } else {
        input.session_id.trim().to_string()
    };
    state
        .store
        .ensure_session_dir(&session_id)
        .map_err(classify_store_error)?;

    let mut used_files = Vec::new();
    for (name, bytes) in &input.uploads {
        let stored = state
            .store
            .save_file(&session_id, name, bytes)
            .map_err(classify_store_error)?;
        info!(session = %session_id, file = %stored, bytes = bytes.len(), "upload stored");
        used_files.push(stored);
    }

    // Extraction and scanning are blocking work; keep them off the
    // async workers.
    let snapshot = {
        let store = state.store.clone();
        let sid = session_id.clone();
        tokio::task::spawn_blocking(move || store.load_session(&sid))
            .await
            .map_err(|e| internal(e.to_string()))?
            .map_err(|e| internal(e.to_string()))?
    };

    let message = input.message.trim().to_string();

    // No message: report session status and stored files.
    if message.is_empty() {
        let names: Vec<String> = snapshot.documents.iter().map(|d| d.name.clone()).collect();
        let listing = if names.is_empty() {
            "(none)".to_string()
        } else {
            names.join(", ")
        };
        return Ok(Json(ChatResponse {
            session_id,
            reply: format!(
                "Session ready. Send a question or attach a PDF.\nCurrent documents: {}",
                listing
            ),
            used_files,
            mode: "status".to_string(),
            results: Vec::new(),
        }));
    }

    let params = state.config.retrieval_params();
    let top_k = state.config.retrieval.top_k;
    let outcome = run_query(&snapshot, &message, top_k, &params);

    let (reply, mode, results) = match outcome {
        SearchOutcome::Matches(hits) => {
            let reply = compose_answer(&state, &message, &hits).await;
            (reply, "doc_search".to_string(), hits)
        }
        SearchOutcome::NoMatches => (
            "I couldn't find a clear match in the current documents. Try more \
             specific keywords, or attach the document that covers this."
                .to_string(),
            "chat_fallback".to_string(),
            Vec::new(),
        ),
        SearchOutcome::EmptyQuery => (
            "I couldn't make out any searchable terms in that message — try a \
             few concrete keywords."
                .to_string(),
            "chat_fallback".to_string(),
            Vec::new(),
        ),
        SearchOutcome::EmptyCorpus => (
            "There are no searchable documents in this session yet. Attach a \
             PDF and ask again."
                .to_string(),
            "chat".to_string(),
            Vec::new(),
        ),
    };

    Ok(Json(ChatResponse {
        session_id,
        reply,
        used_files,
        mode,
        results,
    }))
}

/// Decode the request as multipart form data or JSON, by content type.
async fn read_chat_input(req: Request) -> Result<ChatInput, AppError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| bad_request(e.to_string()))?;

        let mut input = ChatInput {
            message: String::new(),
            session_id: String::new(),
            uploads: Vec::new(),
        };

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(e.to_string()))?
        {
            let field_name = field.name().unwrap_or("").to_string();
            match field_name.as_str() {
                "message" => {
                    input.message = field.text().await.map_err(|e| bad_request(e.to_string()))?;
                }
                "session_id" => {
                    input.session_id =
                        field.text().await.map_err(|e| bad_request(e.to_string()))?;
                }
                "files" => {
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
                    if let Some(name) = file_name {
                        if !name.is_empty() {
                            input.uploads.push((name, bytes.to_vec()));
                        }
                    }
                }
                other => {
                    warn!(field = other, "ignoring unknown multipart field");
                }
            }
        }
        return Ok(input);
    }

    // Anything else is treated as JSON; a missing or unparsable body is
    // an empty chat turn, matching the original service's leniency.
    let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .map_err(|e| bad_request(e.to_string()))?;
    let body: ChatJsonBody = serde_json::from_slice(&bytes).unwrap_or_default();
    Ok(ChatInput {
        message: body.message,
        session_id: body.session_id,
        uploads: Vec::new(),
    })
}

/// Build the reply for a successful search: the augmentor's answer when
/// one is configured and succeeds, otherwise the extractive hit list.
/// Augmentation failure is logged and degraded, never surfaced.
async fn compose_answer(state: &AppState, question: &str, hits: &[SearchHit]) -> String {
    if state.augmentor.is_enabled() {
        match state.augmentor.answer(question, hits).await {
            Ok(answer) => return answer,
            Err(e) => {
                warn!(error = %e, "augmentation failed; falling back to extractive reply");
            }
        }
    }
    extractive_reply(hits)
}

/// Format ranked hits as a bulleted evidence list.
fn extractive_reply(hits: &[SearchHit]) -> String {
    let mut lines = Vec::with_capacity(hits.len());
    for hit in hits {
        match hit.page_number {
            Some(page) => lines.push(format!(
                "• {}  ({}, p.{})",
                hit.snippet, hit.document_name, page
            )),
            None => lines.push(format!("• {}  ({})", hit.snippet, hit.document_name)),
        }
    }
    format!(
        "Here is the most relevant material from your documents:\n\n{}",
        lines.join("\n")
    )
}
