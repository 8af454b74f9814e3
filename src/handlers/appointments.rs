use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Appointment, AppointmentPatch, NewAppointment, TimeInterval};
use crate::services::availability::compute_available_slots;
use crate::state::AppState;

/// Bearer-token check shared by every administrative endpoint.
pub fn check_auth(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let supplied = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if supplied == expected {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

#[derive(Deserialize)]
pub struct AvailableQuery {
    pub date: String,
    pub duration: Option<u32>,
}

#[derive(Serialize)]
pub struct SlotResponse {
    pub start: String,
    pub end: String,
    pub available: bool,
}

#[derive(Serialize)]
pub struct AvailableResponse {
    pub date: String,
    pub slots: Vec<SlotResponse>,
}

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<AvailableResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let day = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInterval("invalid date format, use YYYY-MM-DD".to_string())
    })?;
    let duration = query
        .duration
        .unwrap_or(state.config.slot_duration_minutes);

    let booked = state
        .appointments
        .booked_intervals_for_day(day, &state.window)
        .await?;
    let slots = compute_available_slots(day, &state.window, duration, &booked)?;

    Ok(Json(AvailableResponse {
        date: query.date,
        slots: slots
            .iter()
            .map(|s| SlotResponse {
                start: s.start.format("%H:%M").to_string(),
                end: s.end.format("%H:%M").to_string(),
                available: s.available,
            })
            .collect(),
    }))
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: String,
    pub status: String,
}

impl From<&Appointment> for AppointmentResponse {
    fn from(a: &Appointment) -> Self {
        Self {
            id: a.id.clone(),
            start_time: a.interval.start(),
            end_time: a.interval.end(),
            customer_name: a.customer_name.clone(),
            customer_phone: a.customer_phone.clone(),
            service_type: a.service_type.clone(),
            status: a.status.as_str().to_string(),
        }
    }
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let interval = TimeInterval::new(request.start_time, request.end_time)?;
    let appointment = state
        .appointments
        .create(NewAppointment {
            interval,
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            service_type: request.service_type,
            notes: request.notes,
        })
        .await?;

    // The appointment already exists in the calendar of record; a failed
    // confirmation send is logged, not compensated.
    let confirmation = state.dispatcher.confirmation_message(&appointment).await;
    if let Err(e) = state
        .messaging
        .send_text(&appointment.customer_phone, &confirmation)
        .await
    {
        tracing::warn!(
            appointment_id = %appointment.id,
            error = %e,
            "confirmation message not delivered"
        );
    }

    Ok((StatusCode::CREATED, Json((&appointment).into())))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub appointments: Vec<AppointmentResponse>,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let appointments = match query.phone {
        Some(phone) => {
            state
                .appointments
                .find_by_phone(&phone, state.dispatcher.local_now())
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(ListResponse {
        appointments: appointments.iter().map(AppointmentResponse::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let interval = match (request.start_time, request.end_time) {
        (Some(start), Some(end)) => Some(TimeInterval::new(start, end)?),
        (None, None) => None,
        _ => {
            return Err(AppError::InvalidInterval(
                "start_time and end_time must be supplied together".to_string(),
            ))
        }
    };

    let appointment = state
        .appointments
        .update(
            &id,
            AppointmentPatch {
                interval,
                notes: request.notes,
            },
        )
        .await?;

    Ok(Json((&appointment).into()))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    if state.appointments.cancel(&id).await? {
        Ok(Json(serde_json::json!({
            "message": "appointment cancelled",
            "id": id,
        })))
    } else {
        Err(AppError::NotFound(format!("appointment {id}")))
    }
}
