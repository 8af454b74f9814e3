pub mod appointments;
pub mod chat;
pub mod health;
pub mod webhook;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/webhook/whatsapp", get(webhook::verify_webhook))
        .route("/webhook/whatsapp", post(webhook::receive_webhook))
        .route(
            "/api/v1/appointments/available",
            get(appointments::available_slots),
        )
        .route("/api/v1/appointments", post(appointments::create_appointment))
        .route("/api/v1/appointments", get(appointments::list_appointments))
        .route(
            "/api/v1/appointments/:id",
            patch(appointments::update_appointment),
        )
        .route(
            "/api/v1/appointments/:id",
            delete(appointments::cancel_appointment),
        )
        .route("/api/v1/chat", post(chat::chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
