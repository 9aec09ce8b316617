use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{ApiError, AppState};
use crate::model::Generation;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Returns the `message` field when it is a non-empty string.
fn extract_message(payload: &Value) -> Option<&str> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}

fn rejection_error(rejection: &JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_)
        | JsonRejection::JsonSyntaxError(_)
        | JsonRejection::JsonDataError(_) => ApiError::NotJson,
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => ApiError::BodyTooLarge,
        _ => ApiError::UnreadableBody,
    }
}

/// `POST /chat`: forwards `message` to the model and relays its text.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected chat request body");
        rejection_error(&rejection)
    })?;
    let message = extract_message(&payload).ok_or(ApiError::MissingMessage)?;

    match state.gateway.generate(message).await {
        Ok(Generation::Text(response)) => {
            info!(
                model = %state.gateway.model(),
                message_len = message.len(),
                response_len = response.len(),
                "chat request completed"
            );
            Ok(Json(ChatResponse { response }))
        }
        Ok(Generation::Empty { reason }) => {
            warn!(
                model = %state.gateway.model(),
                reason = reason.as_deref().unwrap_or("unknown"),
                "model returned no text"
            );
            Err(ApiError::UnexpectedModelResponse)
        }
        Err(err) => {
            error!(
                model = %state.gateway.model(),
                error = %format!("{err:#}"),
                "model call failed"
            );
            Err(ApiError::Internal)
        }
    }
}
