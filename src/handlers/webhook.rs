use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::models::WebhookPayload;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Subscription verification handshake: echo the challenge when the token
/// matches, 403 otherwise.
pub async fn verify_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let mode_ok = params.mode.as_deref() == Some("subscribe");
    let token_ok = params.verify_token.as_deref() == Some(state.config.whatsapp_verify_token.as_str());

    match (mode_ok && token_ok, params.challenge) {
        (true, Some(challenge)) => {
            tracing::info!("webhook verified");
            challenge.into_response()
        }
        _ => {
            tracing::warn!("webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        }
    }
}

fn sign(app_secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect(),
    )
}

fn validate_signature(app_secret: &str, signature_header: &str, body: &[u8]) -> bool {
    let Some(received) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    match sign(app_secret, body) {
        Some(expected) => expected == received.to_lowercase(),
        None => false,
    }
}

/// Delivery entry point and outermost error boundary: every failure past
/// authentication is logged with a correlation id and acknowledged as
/// success, so the sender never retry-storms a transient internal fault.
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = uuid::Uuid::new_v4().to_string();

    // Signature validation is skipped when no app secret is configured (dev mode).
    if !state.config.whatsapp_app_secret.is_empty() {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !validate_signature(&state.config.whatsapp_app_secret, signature, &body) {
            tracing::warn!(correlation_id = %correlation_id, "invalid webhook signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(correlation_id = %correlation_id, error = %e, "unparsable webhook body");
            return soft_ack();
        }
    };

    match state.dispatcher.handle_delivery(&payload).await {
        Ok(outcome) => {
            tracing::info!(correlation_id = %correlation_id, outcome = ?outcome, "webhook processed");
        }
        Err(e) => {
            tracing::error!(
                correlation_id = %correlation_id,
                error = %e,
                "webhook processing failed, acknowledging anyway"
            );
        }
    }

    soft_ack()
}

fn soft_ack() -> Response {
    Json(serde_json::json!({ "status": "ok" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::{sign, validate_signature};

    #[test]
    fn test_signature_round_trip() {
        let body = br#"{"entry":[]}"#;
        let signature = format!("sha256={}", sign("app-secret", body).unwrap());
        assert!(validate_signature("app-secret", &signature, body));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let signature = format!("sha256={}", sign("app-secret", b"original").unwrap());
        assert!(!validate_signature("app-secret", &signature, b"tampered"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = format!("sha256={}", sign("other-secret", b"body").unwrap());
        assert!(!validate_signature("app-secret", &signature, b"body"));
    }

    #[test]
    fn test_missing_prefix_rejected() {
        let signature = sign("app-secret", b"body").unwrap();
        assert!(!validate_signature("app-secret", &signature, b"body"));
    }
}
