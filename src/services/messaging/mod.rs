pub mod whatsapp;

use async_trait::async_trait;

use crate::errors::AppError;

/// Reply button attached to an interactive message.
#[derive(Debug, Clone)]
pub struct Button {
    pub id: String,
    pub title: String,
}

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Sends a plain text message and returns the channel's message id.
    async fn send_text(&self, to: &str, body: &str) -> Result<String, AppError>;

    /// Sends a button message. At most 3 buttons; titles are truncated to
    /// the channel's 20-character limit.
    async fn send_interactive(
        &self,
        to: &str,
        body: &str,
        buttons: &[Button],
    ) -> Result<String, AppError>;

    async fn mark_read(&self, message_id: &str) -> Result<bool, AppError>;
}
