//! Model provider integration — chat calls with tool use.
//!
//! The [`Generator`](crate::Generator) talks to hosted models through the
//! [`LlmProvider`] trait. The only bundled backend is Anthropic's Messages
//! API; tests substitute scripted providers.
//!
//! ```text
//! ┌───────────┐     ┌─────────────┐
//! │ Generator │────▶│ LlmProvider │  (trait)
//! └───────────┘     └──────┬──────┘
//!                          │
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!       ┌──────────────┐    ┌────────────────┐
//!       │  Anthropic   │    │    Scripted    │
//!       │ (Claude API) │    │ (test-utils)   │
//!       └──────────────┘    └────────────────┘
//! ```

pub mod anthropic;
pub mod provider;
pub mod types;

use std::time::Duration;

use coursemind_config::{LlmConfig, LlmProviderKind};

pub use anthropic::AnthropicProvider;
pub use provider::{LlmError, LlmProvider};
pub use types::*;

/// Create a model provider from config.
///
/// Reads the `[llm]` section to pick the backend and authenticate. An empty
/// `api_key` falls back to the `ANTHROPIC_API_KEY` environment variable.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    let api_key = config
        .resolved_api_key()
        .ok_or_else(|| LlmError::Auth("no API key configured".to_string()))?;
    provider_with_key(config, api_key)
}

fn provider_with_key(
    config: &LlmConfig,
    api_key: String,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match config.provider {
        LlmProviderKind::Anthropic => {
            let provider = AnthropicProvider::new(api_key)
                .with_base_url(&config.base_url)
                .with_timeout(Duration::from_secs(config.timeout_secs))?;
            Ok(Box::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_anthropic_provider() {
        let config = LlmConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "Anthropic");
    }

    #[test]
    fn test_provider_with_key_needs_no_configured_key() {
        let config = LlmConfig::default();
        let provider = provider_with_key(&config, "explicit".to_string()).unwrap();
        assert_eq!(provider.name(), "Anthropic");
    }
}
