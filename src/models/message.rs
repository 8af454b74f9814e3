use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

/// Inbound webhook body. Every nested key is optional: status-only
/// callbacks and partial payloads must parse cleanly to empty defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub value: WebhookValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
    #[serde(default)]
    pub contacts: Vec<RawContact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub text: Option<RawText>,
    pub interactive: Option<RawInteractive>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawText {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInteractive {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub button_reply: Option<RawButtonReply>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawButtonReply {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContact {
    pub profile: Option<RawProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub name: String,
}

/// One parsed message out of a webhook delivery.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Deduplication key. Delivery is at-least-once, so the same id can
    /// arrive more than once.
    pub message_id: String,
    pub from: String,
    pub timestamp: NaiveDateTime,
    pub contact_name: String,
    pub kind: MessageKind,
}

#[derive(Debug, Clone)]
pub enum MessageKind {
    Text {
        body: String,
    },
    Interactive {
        button_id: String,
        button_title: String,
    },
    Unsupported {
        kind: String,
    },
}

impl WebhookPayload {
    /// Extracts the first message, if any. A payload without messages
    /// (e.g. a delivery-status callback) returns `None` and is a valid
    /// terminal state for the router.
    pub fn first_message(&self) -> Option<InboundMessage> {
        let value = &self.entry.first()?.changes.first()?.value;
        let raw = value.messages.first()?;

        if raw.id.is_empty() || raw.from.is_empty() {
            return None;
        }

        let timestamp = raw
            .timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc())
            .unwrap_or_default();

        let contact_name = value
            .contacts
            .first()
            .and_then(|c| c.profile.as_ref())
            .map(|p| p.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let kind = match raw.kind.as_str() {
            "text" => MessageKind::Text {
                body: raw.text.as_ref().map(|t| t.body.clone()).unwrap_or_default(),
            },
            "interactive" => {
                let reply = raw
                    .interactive
                    .as_ref()
                    .filter(|i| i.kind == "button_reply")
                    .and_then(|i| i.button_reply.as_ref());
                match reply {
                    Some(r) => MessageKind::Interactive {
                        button_id: r.id.clone(),
                        button_title: r.title.clone(),
                    },
                    None => MessageKind::Unsupported {
                        kind: "interactive".to_string(),
                    },
                }
            }
            other => MessageKind::Unsupported {
                kind: other.to_string(),
            },
        };

        Some(InboundMessage {
            message_id: raw.id.clone(),
            from: raw.from.clone(),
            timestamp,
            contact_name,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WebhookPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_text_message() {
        let payload = parse(
            r#"{"entry":[{"changes":[{"value":{
                "messages":[{"id":"wamid.1","from":"5511999990000","timestamp":"1718553600","type":"text","text":{"body":"quero agendar"}}],
                "contacts":[{"profile":{"name":"Maria"}}]
            }}]}]}"#,
        );
        let msg = payload.first_message().unwrap();
        assert_eq!(msg.message_id, "wamid.1");
        assert_eq!(msg.from, "5511999990000");
        assert_eq!(msg.contact_name, "Maria");
        assert!(matches!(msg.kind, MessageKind::Text { ref body } if body == "quero agendar"));
        assert_eq!(msg.timestamp.to_string(), "2024-06-16 16:00:00");
    }

    #[test]
    fn test_parse_button_reply() {
        let payload = parse(
            r#"{"entry":[{"changes":[{"value":{
                "messages":[{"id":"wamid.2","from":"5511999990000","timestamp":"0","type":"interactive",
                    "interactive":{"type":"button_reply","button_reply":{"id":"cancel_appointment","title":"Cancelar"}}}]
            }}]}]}"#,
        );
        let msg = payload.first_message().unwrap();
        match msg.kind {
            MessageKind::Interactive {
                button_id,
                button_title,
            } => {
                assert_eq!(button_id, "cancel_appointment");
                assert_eq!(button_title, "Cancelar");
            }
            other => panic!("expected interactive, got {other:?}"),
        }
    }

    #[test]
    fn test_status_only_payload_has_no_message() {
        let payload = parse(r#"{"entry":[{"changes":[{"value":{"statuses":[{"id":"x"}]}}]}]}"#);
        assert!(payload.first_message().is_none());
    }

    #[test]
    fn test_empty_payload_parses() {
        assert!(parse("{}").first_message().is_none());
        assert!(parse(r#"{"entry":[]}"#).first_message().is_none());
        assert!(parse(r#"{"entry":[{}]}"#).first_message().is_none());
        assert!(parse(r#"{"entry":[{"changes":[{}]}]}"#).first_message().is_none());
    }

    #[test]
    fn test_message_without_id_is_dropped() {
        let payload = parse(
            r#"{"entry":[{"changes":[{"value":{"messages":[{"from":"551","type":"text","text":{"body":"oi"}}]}}]}]}"#,
        );
        assert!(payload.first_message().is_none());
    }

    #[test]
    fn test_unsupported_type_is_tagged() {
        let payload = parse(
            r#"{"entry":[{"changes":[{"value":{"messages":[{"id":"wamid.3","from":"551","timestamp":"0","type":"image"}]}}]}]}"#,
        );
        let msg = payload.first_message().unwrap();
        assert!(matches!(msg.kind, MessageKind::Unsupported { ref kind } if kind == "image"));
    }

    #[test]
    fn test_missing_contact_defaults_to_unknown() {
        let payload = parse(
            r#"{"entry":[{"changes":[{"value":{"messages":[{"id":"wamid.4","from":"551","timestamp":"oops","type":"text","text":{"body":"oi"}}]}}]}]}"#,
        );
        let msg = payload.first_message().unwrap();
        assert_eq!(msg.contact_name, "Unknown");
        // Unparsable timestamp falls back to the epoch
        assert_eq!(msg.timestamp.and_utc().timestamp(), 0);
    }
}
