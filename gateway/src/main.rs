mod api;
mod auth;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::DecodingKey;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use copilot_core::{
    Agent, Brain, ChatRequest, ChatResponse, ExecuteActionRequest, ExecuteActionResponse,
    LanguageBackend,
};
use copilot_tools::MemoryStore;

use crate::api::{ApiError, ChatBody, ConversationsResponse, ExecuteBody};
use crate::auth::AuthCaller;

const DEFAULT_LLM_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct AppState {
    agent: Arc<Agent>,
    jwt_key: DecodingKey,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .compact()
        .init();

    dotenvy::dotenv().ok();

    let secret =
        std::env::var("COPILOT_JWT_SECRET").context("COPILOT_JWT_SECRET must be set")?;

    let backend = match Brain::from_env() {
        Some(brain) => Some(Arc::new(brain) as Arc<dyn LanguageBackend>),
        None => {
            info!("no language backend configured; intent resolution uses the keyword fallback");
            None
        }
    };

    let llm_timeout = std::env::var("COPILOT_LLM_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS);

    let store = Arc::new(MemoryStore::new());
    let agent = Arc::new(Agent::new(
        store,
        backend,
        Duration::from_secs(llm_timeout),
    ));

    let state = AppState {
        agent,
        jwt_key: auth::decoding_key(&secret),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/copilot/chat", post(chat))
        .route("/api/copilot/execute", post(execute_action))
        .route("/api/copilot/conversations", get(conversations))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr =
        std::env::var("COPILOT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "copilot gateway listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn chat(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = ChatRequest {
        message: body.message,
        conversation_id: body.conversation_id,
        path: body.context.current_path,
    };
    let response = state.agent.chat(&caller, request).await?;
    Ok(Json(response))
}

async fn execute_action(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(body): Json<ExecuteBody>,
) -> Result<Json<ExecuteActionResponse>, ApiError> {
    let request = ExecuteActionRequest {
        action_id: body.action_id,
        conversation_id: body.conversation_id,
        confirmed: body.confirmed,
    };
    let response = state.agent.execute_action(&caller, request).await?;
    Ok(Json(response))
}

async fn conversations(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Json<ConversationsResponse> {
    Json(ConversationsResponse {
        conversations: state.agent.conversations(&caller).await,
    })
}
