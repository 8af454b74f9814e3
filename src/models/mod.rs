pub mod appointment;
pub mod intent;
pub mod interval;
pub mod message;

pub use appointment::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
pub use intent::Intent;
pub use interval::{AvailableSlot, BusinessWindow, TimeInterval};
pub use message::{InboundMessage, MessageKind, WebhookPayload};
