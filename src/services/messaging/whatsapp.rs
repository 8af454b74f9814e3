use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Button, MessagingProvider};
use crate::errors::AppError;

const API_VERSION: &str = "v17.0";
const MAX_BUTTONS: usize = 3;
const MAX_BUTTON_TITLE_CHARS: usize = 20;

pub struct WhatsAppProvider {
    api_token: String,
    phone_number_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl WhatsAppProvider {
    pub fn new(
        api_token: String,
        phone_number_id: String,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            phone_number_id,
            base_url: format!("https://graph.facebook.com/{API_VERSION}"),
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.base_url, self.phone_number_id)
    }

    async fn post_message(&self, payload: Value) -> Result<String, AppError> {
        let resp = self
            .client
            .post(self.messages_url())
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let data: Value = resp.json().await?;
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "messaging API error ({status}): {data}"
            )));
        }

        data["messages"][0]["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                AppError::UpstreamUnavailable("messaging API returned no message id".to_string())
            })
    }
}

/// Numbers without a country prefix default to Brazil.
fn normalize_recipient(to: &str) -> String {
    if to.starts_with('+') {
        to.to_string()
    } else {
        format!("+55{to}")
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_BUTTON_TITLE_CHARS).collect()
}

#[async_trait]
impl MessagingProvider for WhatsAppProvider {
    async fn send_text(&self, to: &str, body: &str) -> Result<String, AppError> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": normalize_recipient(to),
            "type": "text",
            "text": { "body": body },
        }))
        .await
    }

    async fn send_interactive(
        &self,
        to: &str,
        body: &str,
        buttons: &[Button],
    ) -> Result<String, AppError> {
        let buttons: Vec<Value> = buttons
            .iter()
            .take(MAX_BUTTONS)
            .map(|b| {
                json!({
                    "type": "reply",
                    "reply": { "id": b.id, "title": truncate_title(&b.title) },
                })
            })
            .collect();

        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": normalize_recipient(to),
            "type": "interactive",
            "interactive": {
                "type": "button",
                "body": { "text": body },
                "action": { "buttons": buttons },
            },
        }))
        .await
    }

    async fn mark_read(&self, message_id: &str) -> Result<bool, AppError> {
        let resp = self
            .client
            .post(self.messages_url())
            .bearer_auth(&self.api_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "status": "read",
                "message_id": message_id,
            }))
            .send()
            .await?;

        Ok(resp.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_recipient() {
        assert_eq!(normalize_recipient("+5511999990000"), "+5511999990000");
        assert_eq!(normalize_recipient("11999990000"), "+5511999990000");
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("Confirmar"), "Confirmar");
        assert_eq!(
            truncate_title("Confirmar agendamento de corte"),
            "Confirmar agendament"
        );
        // Multi-byte characters count as single characters
        assert_eq!(truncate_title("ééééééééééééééééééééé").chars().count(), 20);
    }
}
