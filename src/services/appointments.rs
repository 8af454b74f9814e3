use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::errors::AppError;
use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, BusinessWindow, NewAppointment, TimeInterval};
use crate::services::calendar::{CalendarEvent, CalendarProvider, EventPatch};

/// How far ahead `find_by_phone` searches.
const FIND_LOOKAHEAD_DAYS: i64 = 90;

/// Appointment lifecycle against the calendar of record. Holds no state of
/// its own: every durable mutation is one collaborator call, and callers own
/// the retry policy.
#[derive(Clone)]
pub struct AppointmentManager {
    calendar: Arc<dyn CalendarProvider>,
}

impl AppointmentManager {
    pub fn new(calendar: Arc<dyn CalendarProvider>) -> Self {
        Self { calendar }
    }

    pub async fn create(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        let summary = build_summary(&new.service_type, &new.customer_name);
        let description = build_description(
            &new.customer_name,
            &new.customer_phone,
            new.notes.as_deref(),
        );

        let id = self
            .calendar
            .insert_event(
                &summary,
                &description,
                new.interval.start(),
                new.interval.end(),
            )
            .await?;

        tracing::info!(event_id = %id, "appointment created");

        Ok(Appointment {
            id,
            interval: new.interval,
            customer_name: new.customer_name,
            customer_phone: new.customer_phone,
            service_type: new.service_type,
            notes: new.notes,
            status: AppointmentStatus::Scheduled,
        })
    }

    /// `Ok(false)` means there was nothing to cancel (unknown or already
    /// cancelled id); transport failures come back as errors.
    pub async fn cancel(&self, appointment_id: &str) -> Result<bool, AppError> {
        let deleted = self.calendar.delete_event(appointment_id).await?;
        if deleted {
            tracing::info!(event_id = %appointment_id, "appointment cancelled");
        }
        Ok(deleted)
    }

    /// Read-modify-write; fields absent from the patch are left untouched.
    /// Supplied notes are appended to the stored description.
    pub async fn update(
        &self,
        appointment_id: &str,
        patch: AppointmentPatch,
    ) -> Result<Appointment, AppError> {
        let current = self.calendar.get_event(appointment_id).await?;

        let event_patch = EventPatch {
            start: patch.interval.map(|i| i.start()),
            end: patch.interval.map(|i| i.end()),
            description: patch
                .notes
                .map(|notes| format!("{}\n\nAtualização: {notes}", current.description)),
        };

        let updated = self.calendar.update_event(appointment_id, event_patch).await?;
        tracing::info!(event_id = %appointment_id, "appointment updated");
        appointment_from_event(&updated)
    }

    /// Best-effort free-text match: keeps upcoming events whose stored
    /// description contains the phone string. Differently formatted numbers
    /// in stored text are missed.
    pub async fn find_by_phone(
        &self,
        phone: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<Appointment>, AppError> {
        let events = self
            .calendar
            .list_events(now, now + Duration::days(FIND_LOOKAHEAD_DAYS))
            .await?;

        events
            .iter()
            .filter(|e| e.description.contains(phone))
            .map(appointment_from_event)
            .collect()
    }

    /// The day's booked intervals inside the business window, sorted by
    /// start, ready for the availability engine. An event with `end <= start`
    /// is a data-contract violation and is rejected, not skipped.
    pub async fn booked_intervals_for_day(
        &self,
        day: NaiveDate,
        window: &BusinessWindow,
    ) -> Result<Vec<TimeInterval>, AppError> {
        let events = self
            .calendar
            .list_events(day.and_time(window.open()), day.and_time(window.close()))
            .await?;

        let mut intervals = events
            .iter()
            .map(|e| TimeInterval::new(e.start, e.end))
            .collect::<Result<Vec<_>, _>>()?;
        intervals.sort_by_key(|i| i.start());
        Ok(intervals)
    }
}

fn build_summary(service_type: &str, customer_name: &str) -> String {
    format!("{service_type} - {customer_name}")
}

fn build_description(customer_name: &str, customer_phone: &str, notes: Option<&str>) -> String {
    format!(
        "Cliente: {customer_name}\nTelefone: {customer_phone}\n{}",
        notes.unwrap_or_default()
    )
}

fn appointment_from_event(event: &CalendarEvent) -> Result<Appointment, AppError> {
    let (service_type, summary_name) = match event.summary.split_once(" - ") {
        Some((service, name)) => (service.to_string(), name.to_string()),
        None => (event.summary.clone(), String::new()),
    };

    let mut customer_name = summary_name;
    let mut customer_phone = String::new();
    for line in event.description.lines() {
        if let Some(name) = line.strip_prefix("Cliente: ") {
            customer_name = name.to_string();
        } else if let Some(phone) = line.strip_prefix("Telefone: ") {
            customer_phone = phone.to_string();
        }
    }

    Ok(Appointment {
        id: event.id.clone(),
        interval: TimeInterval::new(event.start, event.end)?,
        customer_name,
        customer_phone,
        service_type,
        notes: None,
        status: AppointmentStatus::Scheduled,
    })
}
