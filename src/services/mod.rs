pub mod ai;
pub mod appointments;
pub mod availability;
pub mod calendar;
pub mod dedup;
pub mod dispatch;
pub mod intent;
pub mod messaging;
pub mod safety;
