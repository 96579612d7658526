//! HTTP API host for the dialogue decoder.
//!
//! A thin adapter: requests carry the text and (optionally) the session
//! history; the response returns the updated history so the host stays
//! stateless. One generator is shared behind a mutex, which also serializes
//! model invocations across concurrent requests.

use crate::decoding::DialogueGenerator;
use crate::errors::ChitchatError;
use crate::history::History;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct ServerState {
    pub generator: Arc<Mutex<DialogueGenerator>>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub text: String,
    #[serde(default)]
    pub history: Option<History>,
}

#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub text: String,
    pub history: History,
    pub finish_reason: String,
    pub usage: UsageStats,
}

#[derive(Debug, Serialize)]
pub struct UsageStats {
    pub completion_tokens: usize,
    pub time_ms: f64,
}

/// Serve the decoder on the given port until the process is stopped.
pub async fn run_server(generator: DialogueGenerator, port: u16) -> Result<(), ChitchatError> {
    let state = Arc::new(ServerState {
        generator: Arc::new(Mutex::new(generator)),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/v1/respond", post(respond))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ChitchatError::Io)?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await.map_err(ChitchatError::Io)?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn respond(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, ApiError> {
    let mut history = request.history.unwrap_or_default();
    let start = Instant::now();

    let reply = {
        let mut generator = state.generator.lock().await;
        generator.respond(&request.text, &mut history)?
    };
    let time_ms = start.elapsed().as_secs_f64() * 1000.0;

    Ok(Json(RespondResponse {
        text: reply.text,
        finish_reason: reply.finish_reason.as_str().to_string(),
        usage: UsageStats {
            completion_tokens: reply.token_ids.len(),
            time_ms,
        },
        history,
    }))
}

pub struct ApiError(ChitchatError);

impl From<ChitchatError> for ApiError {
    fn from(err: ChitchatError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ChitchatError::Encoding(_) | ChitchatError::InvalidFilterConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}
