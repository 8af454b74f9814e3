use std::sync::Arc;

use chrono::FixedOffset;

use crate::config::AppConfig;
use crate::models::BusinessWindow;
use crate::services::appointments::AppointmentManager;
use crate::services::dispatch::Dispatcher;
use crate::services::messaging::MessagingProvider;

/// Shared handles for the HTTP layer. Collaborators are injected here once
/// at startup; no component does ambient/global lookup.
pub struct AppState {
    pub config: AppConfig,
    pub window: BusinessWindow,
    pub utc_offset: FixedOffset,
    pub appointments: AppointmentManager,
    pub messaging: Arc<dyn MessagingProvider>,
    pub dispatcher: Dispatcher,
}
