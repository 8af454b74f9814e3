use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::handlers::appointments::check_auth;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    #[serde(default)]
    pub send_whatsapp: bool,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub user_id: String,
    pub intent: crate::models::Intent,
    pub processed: bool,
}

/// Direct chat endpoint: same pipeline as the webhook, but the caller gets
/// the reply in the response body and may ask for a WhatsApp relay.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, Response> {
    check_auth(&headers, &state.config.api_token).map_err(IntoResponse::into_response)?;

    let (intent, response) = state
        .dispatcher
        .chat_reply(&request.message)
        .await
        .map_err(IntoResponse::into_response)?;

    if request.send_whatsapp {
        let Some(number) = request.whatsapp_number.as_deref() else {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "whatsapp_number is required when send_whatsapp is true"
                })),
            )
                .into_response());
        };

        state
            .messaging
            .send_text(number, &response)
            .await
            .map_err(IntoResponse::into_response)?;
    }

    Ok(Json(ChatResponse {
        response,
        user_id: request.user_id,
        intent,
        processed: true,
    }))
}
