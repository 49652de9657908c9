//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for the tools and a shared assistant session.

use crate::agent::ToolCallRecord;
use crate::assistant::{AssistantSession, FileKind};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::ToolRegistry;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    tools: Arc<ToolRegistry>,
    session: Mutex<AssistantSession>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let tools = Arc::new(ToolRegistry::with_defaults(&settings.tools)?);
    let session = AssistantSession::with_tools(tools.clone(), &settings)?;

    let state = Arc::new(AppState {
        tools,
        session: Mutex::new(session),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Palaver API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("List tools", "GET    /tools");
    Output::kv("Run tool", "POST   /tools/:name");
    Output::kv("Chat", "POST   /chat");
    Output::kv("Attach file", "POST   /files");
    Output::kv("Reset chat", "DELETE /chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(run_tool))
        .route("/chat", post(chat).delete(clear_chat))
        .route("/files", post(attach_file))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    description: String,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
    total: usize,
}

#[derive(Deserialize)]
struct ToolRequest {
    input: String,
}

#[derive(Serialize)]
struct ToolResponse {
    tool: String,
    output: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    tool_calls: Vec<ToolCallRecord>,
    iterations: usize,
}

#[derive(Deserialize)]
struct AttachRequest {
    kind: FileKind,
    path: String,
    /// Copy the file into the uploads directory first
    #[serde(default = "default_copy")]
    copy: bool,
}

fn default_copy() -> bool {
    true
}

#[derive(Serialize)]
struct AttachResponse {
    kind: FileKind,
    path: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ToolListResponse {
        total: state.tools.len(),
        tools: state
            .tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect(),
    })
}

async fn run_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<ToolRequest>,
) -> impl IntoResponse {
    match state.tools.execute(&name, &req.input).await {
        Ok(output) => Json(ToolResponse { tool: name, output }).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    match session.try_chat(&req.message).await {
        Ok(response) => Json(ChatResponse {
            reply: response.content,
            tool_calls: response.tool_calls,
            iterations: response.iterations,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e),
    }
}

async fn clear_chat(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.lock().await.clear();
    info!("Chat memory cleared");
    Json(serde_json::json!({ "status": "cleared" }))
}

async fn attach_file(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AttachRequest>,
) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    match session
        .attach(req.kind, std::path::Path::new(&req.path), req.copy)
        .await
    {
        Ok(path) => Json(AttachResponse {
            kind: req.kind,
            path: path.display().to_string(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e),
    }
}
