pub mod chat;
pub mod index;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::model_gateway::ModelGateway;

/// Largest request body accepted on any route.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ModelGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }
}

/// Errors surfaced to HTTP clients as `{"error": ...}`.
///
/// Upstream variants deliberately carry no detail; the handler logs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    NotJson,
    BodyTooLarge,
    UnreadableBody,
    MissingMessage,
    UnexpectedModelResponse,
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotJson => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnreadableBody | Self::MissingMessage => StatusCode::BAD_REQUEST,
            Self::UnexpectedModelResponse | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotJson => "Request must be JSON",
            Self::BodyTooLarge => "Request body too large",
            Self::UnreadableBody => "Failed to read request body",
            Self::MissingMessage => "Missing message",
            Self::UnexpectedModelResponse => "Received an unexpected response from the model.",
            Self::Internal => "An internal error occurred.",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Routes `/` and `/chat` over the injected gateway, with request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/chat", post(chat::chat))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
