use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use super::{CalendarEvent, CalendarProvider, EventPatch};
use crate::errors::AppError;

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleCalendarProvider {
    calendar_id: String,
    api_token: String,
    /// RFC 3339 offset suffix for the fixed business timezone, e.g. "-03:00".
    utc_offset: String,
    client: reqwest::Client,
}

impl GoogleCalendarProvider {
    pub fn new(
        calendar_id: String,
        api_token: String,
        utc_offset: String,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            calendar_id,
            api_token,
            utc_offset,
            client,
        })
    }

    fn events_url(&self) -> String {
        format!("{BASE_URL}/calendars/{}/events", self.calendar_id)
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{event_id}", self.events_url())
    }

    fn format_local(&self, dt: NaiveDateTime) -> String {
        format!("{}{}", dt.format("%Y-%m-%dT%H:%M:%S"), self.utc_offset)
    }

    async fn read_body(&self, resp: reqwest::Response) -> Result<Value, AppError> {
        let status = resp.status();
        let data: Value = resp.json().await?;
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "calendar API error ({status}): {data}"
            )));
        }
        Ok(data)
    }
}

/// Accepts both timed events ("dateTime") and all-day events ("date").
fn parse_event_time(node: &Value) -> Option<NaiveDateTime> {
    if let Some(s) = node["dateTime"].as_str() {
        return DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local());
    }
    node["date"]
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_event(item: &Value) -> Option<CalendarEvent> {
    Some(CalendarEvent {
        id: item["id"].as_str()?.to_string(),
        summary: item["summary"].as_str().unwrap_or_default().to_string(),
        description: item["description"].as_str().unwrap_or_default().to_string(),
        start: parse_event_time(&item["start"])?,
        end: parse_event_time(&item["end"])?,
    })
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn list_events(
        &self,
        time_min: NaiveDateTime,
        time_max: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let resp = self
            .client
            .get(self.events_url())
            .bearer_auth(&self.api_token)
            .query(&[
                ("timeMin", self.format_local(time_min)),
                ("timeMax", self.format_local(time_max)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        let data = self.read_body(resp).await?;
        let items = data["items"].as_array().cloned().unwrap_or_default();
        Ok(items.iter().filter_map(parse_event).collect())
    }

    async fn insert_event(
        &self,
        summary: &str,
        description: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<String, AppError> {
        let body = json!({
            "summary": summary,
            "description": description,
            "start": { "dateTime": self.format_local(start) },
            "end": { "dateTime": self.format_local(end) },
            "reminders": {
                "useDefault": false,
                "overrides": [{ "method": "popup", "minutes": 30 }],
            },
        });

        let resp = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let data = self.read_body(resp).await?;
        data["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                AppError::UpstreamUnavailable("calendar insert returned no event id".to_string())
            })
    }

    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent, AppError> {
        let resp = self
            .client
            .get(self.event_url(event_id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("event {event_id}")));
        }

        let data = self.read_body(resp).await?;
        parse_event(&data).ok_or_else(|| {
            AppError::UpstreamUnavailable(format!("unparsable calendar event {event_id}"))
        })
    }

    async fn update_event(
        &self,
        event_id: &str,
        patch: EventPatch,
    ) -> Result<CalendarEvent, AppError> {
        let mut body = serde_json::Map::new();
        if let Some(start) = patch.start {
            body.insert("start".into(), json!({ "dateTime": self.format_local(start) }));
        }
        if let Some(end) = patch.end {
            body.insert("end".into(), json!({ "dateTime": self.format_local(end) }));
        }
        if let Some(description) = patch.description {
            body.insert("description".into(), json!(description));
        }

        let resp = self
            .client
            .patch(self.event_url(event_id))
            .bearer_auth(&self.api_token)
            .json(&Value::Object(body))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("event {event_id}")));
        }

        let data = self.read_body(resp).await?;
        parse_event(&data).ok_or_else(|| {
            AppError::UpstreamUnavailable(format!("unparsable calendar event {event_id}"))
        })
    }

    async fn delete_event(&self, event_id: &str) -> Result<bool, AppError> {
        let resp = self
            .client
            .delete(self.event_url(event_id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Ok(false);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "calendar delete failed ({status}): {body}"
            )));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timed_event() {
        let item = serde_json::json!({
            "id": "evt1",
            "summary": "Corte - Maria",
            "description": "Cliente: Maria\nTelefone: 5511999990000",
            "start": { "dateTime": "2025-06-16T10:00:00-03:00" },
            "end": { "dateTime": "2025-06-16T10:30:00-03:00" },
        });
        let event = parse_event(&item).unwrap();
        assert_eq!(event.id, "evt1");
        assert_eq!(event.start.to_string(), "2025-06-16 10:00:00");
        assert_eq!(event.end.to_string(), "2025-06-16 10:30:00");
    }

    #[test]
    fn test_parse_all_day_event() {
        let item = serde_json::json!({
            "id": "evt2",
            "start": { "date": "2025-06-16" },
            "end": { "date": "2025-06-17" },
        });
        let event = parse_event(&item).unwrap();
        assert_eq!(event.start.to_string(), "2025-06-16 00:00:00");
        assert_eq!(event.summary, "");
    }

    #[test]
    fn test_parse_event_without_id_is_dropped() {
        let item = serde_json::json!({
            "start": { "dateTime": "2025-06-16T10:00:00-03:00" },
            "end": { "dateTime": "2025-06-16T10:30:00-03:00" },
        });
        assert!(parse_event(&item).is_none());
    }

    #[test]
    fn test_format_local_appends_offset() {
        let provider = GoogleCalendarProvider::new(
            "cal".to_string(),
            "token".to_string(),
            "-03:00".to_string(),
            10,
        )
        .unwrap();
        let dt = NaiveDateTime::parse_from_str("2025-06-16 08:00", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(provider.format_local(dt), "2025-06-16T08:00:00-03:00");
    }
}
