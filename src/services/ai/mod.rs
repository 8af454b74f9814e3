pub mod gemini;

use async_trait::async_trait;

use crate::errors::AppError;

/// Black-box language backend. Its non-determinism is handled by the
/// response safety filter, not here.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<String, AppError>;
}
