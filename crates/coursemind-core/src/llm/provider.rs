//! Model provider trait — the core abstraction for model calls.
//!
//! All model backends implement this trait. The [`Generator`](crate::Generator)
//! calls through it and awaits each call to completion before doing anything
//! else.

use crate::BoxFuture;

use super::types::{ModelRequest, ModelResponse};

/// Errors from model provider calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    Request(String),

    #[error("authentication failed (check API key): {0}")]
    Auth(String),

    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("context length exceeded: {0}")]
    ContextLength(String),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("provider error: {status} — {message}")]
    ProviderError { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout")]
    Timeout,
}

/// Core trait for model providers.
///
/// Implementations must be `Send + Sync` so one provider can serve many
/// concurrent queries. Uses `BoxFuture` for object safety (allows
/// `Arc<dyn LlmProvider>`).
pub trait LlmProvider: Send + Sync {
    /// Provider display name (e.g. "Anthropic").
    fn name(&self) -> &str;

    /// Perform one model call.
    ///
    /// Fails with an [`LlmError`] on network or provider failure rather than
    /// returning a degraded response.
    fn chat(&self, request: &ModelRequest) -> BoxFuture<'_, Result<ModelResponse, LlmError>>;
}
