//! Anthropic Claude API provider.
//!
//! Implements the [`LlmProvider`] trait for the Anthropic Messages API
//! (`/v1/messages`), including tool use.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::BoxFuture;

use super::provider::{LlmError, LlmProvider};
use super::types::*;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    api_key: Zeroizing<String>,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Zeroizing::new(api_key.into()),
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API host (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Apply a per-request transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;
        Ok(self)
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Convert a [`ModelRequest`] into Anthropic's API format.
    fn build_request_body(&self, request: &ModelRequest) -> AnthropicRequest {
        let messages = request.turns.iter().map(AnthropicMessage::from).collect();

        let tools = request.tools.as_ref().map(|tools| {
            tools
                .iter()
                .map(|t| AnthropicTool {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    input_schema: t.parameters.clone(),
                })
                .collect()
        });

        let tool_choice = request.tool_choice.map(|choice| match choice {
            ToolChoice::Auto => AnthropicToolChoice::Auto,
        });

        AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            system: if request.system.is_empty() {
                None
            } else {
                Some(request.system.clone())
            },
            messages,
            tools,
            tool_choice,
            temperature: request.temperature,
        }
    }

    /// Parse Anthropic's response into a [`ModelResponse`].
    fn parse_response(&self, resp: AnthropicResponse) -> ModelResponse {
        let content = resp
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicBlock::Text { text } => Some(ContentItem::Text { text }),
                AnthropicBlock::ToolUse { id, name, input } => {
                    Some(ContentItem::ToolUse(ToolInvocation {
                        id,
                        name,
                        arguments: input,
                    }))
                }
                AnthropicBlock::ToolResult { .. } | AnthropicBlock::Other => None,
            })
            .collect();

        ModelResponse {
            content,
            termination: TerminationReason::from_stop_reason(resp.stop_reason.as_deref()),
            stop_reason: resp.stop_reason,
            usage: TokenUsage {
                prompt_tokens: resp.usage.input_tokens,
                completion_tokens: resp.usage.output_tokens,
                total_tokens: resp
                    .usage
                    .input_tokens
                    .saturating_add(resp.usage.output_tokens),
            },
            model: resp.model,
        }
    }
}

/// Map a non-success HTTP status and body to an [`LlmError`].
fn status_error(status: u16, body: &str, retry_after: Option<u64>) -> LlmError {
    let message = serde_json::from_str::<AnthropicErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 => LlmError::Auth(message),
        404 => LlmError::ModelNotFound(message),
        429 => LlmError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        400 if message.contains("prompt is too long") => LlmError::ContextLength(message),
        _ => LlmError::ProviderError { status, message },
    }
}

fn transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Network(e.to_string())
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn chat(&self, request: &ModelRequest) -> BoxFuture<'_, Result<ModelResponse, LlmError>> {
        let body = self.build_request_body(request);
        Box::pin(async move {
            debug!(
                model = %body.model,
                turns = body.messages.len(),
                tools = body.tools.as_ref().map_or(0, Vec::len),
                "Anthropic chat request"
            );

            let resp = self
                .client
                .post(self.messages_url())
                .header("x-api-key", self.api_key.as_str())
                .header("anthropic-version", ANTHROPIC_API_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(transport_error)?;

            let status = resp.status();
            if !status.is_success() {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                let error_body = resp.text().await.unwrap_or_default();
                return Err(status_error(status.as_u16(), &error_body, retry_after));
            }

            let api_resp: AnthropicResponse = resp
                .json()
                .await
                .map_err(|e| LlmError::Parse(e.to_string()))?;

            let response = self.parse_response(api_resp);
            debug!(
                stop_reason = ?response.stop_reason,
                output_tokens = response.usage.completion_tokens,
                "Anthropic chat response"
            );
            Ok(response)
        })
    }
}

// ── Anthropic API types (private) ───────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<AnthropicToolChoice>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: AnthropicContent,
}

impl From<&Turn> for AnthropicMessage {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        let content = match &turn.content {
            TurnContent::Text(text) => AnthropicContent::Text(text.clone()),
            TurnContent::Items(items) => {
                AnthropicContent::Blocks(items.iter().map(AnthropicBlock::from).collect())
            }
        };
        Self { role, content }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum AnthropicContent {
    Text(String),
    Blocks(Vec<AnthropicBlock>),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum AnthropicBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    /// Block types this client does not consume (e.g. thinking).
    #[serde(other)]
    Other,
}

impl From<&ContentItem> for AnthropicBlock {
    fn from(item: &ContentItem) -> Self {
        match item {
            ContentItem::Text { text } => AnthropicBlock::Text { text: text.clone() },
            ContentItem::ToolUse(invocation) => AnthropicBlock::ToolUse {
                id: invocation.id.clone(),
                name: invocation.name.clone(),
                input: invocation.arguments.clone(),
            },
            ContentItem::ToolResult(result) => AnthropicBlock::ToolResult {
                tool_use_id: result.tool_use_id.clone(),
                content: result.content.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AnthropicToolChoice {
    Auto,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorEnvelope {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}
