//! Generation service abstraction
//!
//! The intake engine only ever needs "prompt in, text out". Providers sit
//! behind [`LlmService`] so the engine can be tested with a scripted mock.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::{GeminiConfig, GeminiService};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for generation providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;

    /// Generate text for a bare prompt
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.complete(&LlmRequest::new(prompt)).await?;
        Ok(response.text)
    }
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    prompt_chars = request.prompt.len(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    transient = e.kind.is_transient(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Stand-in used when no API key is configured. Every call fails, so the
/// engine answers with its fallback texts instead of crashing.
pub struct UnconfiguredService;

#[async_trait]
impl LlmService for UnconfiguredService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::auth(
            "No generation API key configured. Set GEMINI_API_KEY.",
        ))
    }

    fn model_id(&self) -> &str {
        "unconfigured"
    }
}

/// Build the production generation service from configuration
pub fn create_service(config: &GeminiConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let inner: Arc<dyn LlmService> = match config.api_key.as_deref() {
        Some(key) if !key.is_empty() => Arc::new(GeminiService::new(config)?),
        _ if config.gateway.is_some() => Arc::new(GeminiService::new(config)?),
        _ => Arc::new(UnconfiguredService),
    };
    Ok(Arc::new(LoggingService::new(inner)))
}
