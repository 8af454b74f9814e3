use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::LlmProvider;
use crate::errors::AppError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            model,
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<String, AppError> {
        let url = format!(
            "{BASE_URL}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "maxOutputTokens": max_output_tokens,
                "temperature": temperature,
                "topP": 0.8,
            },
        });

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        let data: Value = resp.json().await?;
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "language API error ({status}): {data}"
            )));
        }

        data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                AppError::UpstreamUnavailable("language API returned no text".to_string())
            })
    }
}
