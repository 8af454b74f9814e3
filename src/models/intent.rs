use serde::{Deserialize, Serialize};

/// Discrete action category inferred from a free-text message.
/// Derived per message, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Schedule,
    CheckAvailability,
    Cancel,
    Reschedule,
    ListAppointments,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Schedule => "schedule",
            Intent::CheckAvailability => "check_availability",
            Intent::Cancel => "cancel",
            Intent::Reschedule => "reschedule",
            Intent::ListAppointments => "list_appointments",
            Intent::Unknown => "unknown",
        }
    }
}
