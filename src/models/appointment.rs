use serde::{Deserialize, Serialize};

use crate::models::TimeInterval;

/// Transient view of a calendar event. The calendar of record owns the
/// persisted identity; this type only travels through requests and replies.
#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: String,
    pub interval: TimeInterval,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => AppointmentStatus::Confirmed,
            "cancelled" => AppointmentStatus::Cancelled,
            "completed" => AppointmentStatus::Completed,
            "no_show" => AppointmentStatus::NoShow,
            _ => AppointmentStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub interval: TimeInterval,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: String,
    pub notes: Option<String>,
}

/// Partial update: `None` fields are left untouched, never cleared.
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub interval: Option<TimeInterval>,
    pub notes: Option<String>,
}
