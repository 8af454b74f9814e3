use std::env;

use chrono::FixedOffset;

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub client_name: String,
    pub api_token: String,
    pub business_open: String,
    pub business_close: String,
    pub slot_duration_minutes: u32,
    pub utc_offset: String,
    pub upstream_timeout_secs: u64,
    pub whatsapp_api_token: String,
    pub whatsapp_phone_number_id: String,
    pub whatsapp_verify_token: String,
    pub whatsapp_app_secret: String,
    pub google_calendar_id: String,
    pub google_api_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            client_name: env::var("CLIENT_NAME").unwrap_or_else(|_| "agendazap".to_string()),
            api_token: env::var("API_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            business_open: env::var("BUSINESS_OPEN").unwrap_or_else(|_| "08:00".to_string()),
            business_close: env::var("BUSINESS_CLOSE").unwrap_or_else(|_| "18:00".to_string()),
            slot_duration_minutes: env::var("SLOT_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            utc_offset: env::var("UTC_OFFSET").unwrap_or_else(|_| "-03:00".to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            whatsapp_api_token: env::var("WHATSAPP_API_TOKEN").unwrap_or_default(),
            whatsapp_phone_number_id: env::var("WHATSAPP_PHONE_NUMBER_ID").unwrap_or_default(),
            whatsapp_verify_token: env::var("WHATSAPP_WEBHOOK_VERIFY_TOKEN").unwrap_or_default(),
            whatsapp_app_secret: env::var("WHATSAPP_APP_SECRET").unwrap_or_default(),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID").unwrap_or_default(),
            google_api_token: env::var("GOOGLE_API_TOKEN").unwrap_or_default(),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
        }
    }
}

/// Parses a `+HH:MM` / `-HH:MM` offset string into a `FixedOffset`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, AppError> {
    let bad = || AppError::Config(format!("invalid UTC offset: {s}"));

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1i32, &s[1..]),
        Some('-') => (-1i32, &s[1..]),
        _ => return Err(bad()),
    };

    let (hours, minutes) = rest.split_once(':').ok_or_else(bad)?;
    let hours: i32 = hours.parse().map_err(|_| bad())?;
    let minutes: i32 = minutes.parse().map_err(|_| bad())?;
    if hours > 23 || minutes > 59 {
        return Err(bad());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}
