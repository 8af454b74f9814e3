use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use agendazap::config::{parse_utc_offset, AppConfig};
use agendazap::handlers;
use agendazap::models::BusinessWindow;
use agendazap::services::ai::gemini::GeminiProvider;
use agendazap::services::ai::LlmProvider;
use agendazap::services::appointments::AppointmentManager;
use agendazap::services::calendar::google::GoogleCalendarProvider;
use agendazap::services::calendar::CalendarProvider;
use agendazap::services::dispatch::Dispatcher;
use agendazap::services::messaging::whatsapp::WhatsAppProvider;
use agendazap::services::messaging::MessagingProvider;
use agendazap::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let window = BusinessWindow::parse(&config.business_open, &config.business_close)?;
    let utc_offset = parse_utc_offset(&config.utc_offset)?;

    let calendar: Arc<dyn CalendarProvider> = Arc::new(GoogleCalendarProvider::new(
        config.google_calendar_id.clone(),
        config.google_api_token.clone(),
        config.utc_offset.clone(),
        config.upstream_timeout_secs,
    )?);
    let messaging: Arc<dyn MessagingProvider> = Arc::new(WhatsAppProvider::new(
        config.whatsapp_api_token.clone(),
        config.whatsapp_phone_number_id.clone(),
        config.upstream_timeout_secs,
    )?);
    let llm: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.upstream_timeout_secs,
    )?);
    tracing::info!(model = %config.gemini_model, "using Gemini language provider");

    let appointments = AppointmentManager::new(Arc::clone(&calendar));
    let dispatcher = Dispatcher::new(
        config.client_name.clone(),
        window.clone(),
        config.slot_duration_minutes,
        utc_offset,
        appointments.clone(),
        Arc::clone(&messaging),
        Arc::clone(&llm),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        window,
        utc_offset,
        appointments,
        messaging,
        dispatcher,
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
