pub mod google;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::errors::AppError;

/// One event as stored by the calendar of record.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Partial event mutation; `None` fields are not touched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub description: Option<String>,
}

/// Narrow interface to the calendar of record, the sole durable store for
/// appointments. All times are business-local; the implementation owns the
/// offset translation on the wire.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Events within `[time_min, time_max)`, ordered by start time.
    async fn list_events(
        &self,
        time_min: NaiveDateTime,
        time_max: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, AppError>;

    /// Inserts an event and returns its backend-assigned id.
    async fn insert_event(
        &self,
        summary: &str,
        description: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<String, AppError>;

    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent, AppError>;

    async fn update_event(
        &self,
        event_id: &str,
        patch: EventPatch,
    ) -> Result<CalendarEvent, AppError>;

    /// Returns `false` when the event does not exist (already deleted ids
    /// included); transport failures surface as errors.
    async fn delete_event(&self, event_id: &str) -> Result<bool, AppError>;
}
