//! Common types for model provider integration.
//!
//! These types define the shared vocabulary for conversations, tool
//! definitions, and model requests/responses, independent of any one
//! provider's wire format.

use serde::{Deserialize, Serialize};

/// Who a [`Turn`] is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A request from the model to invoke a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Opaque correlation token, echoed back in the matching [`ToolResult`].
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Named arguments (a JSON object).
    pub arguments: serde_json::Value,
}

/// The outcome of executing one [`ToolInvocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Correlation token of the invocation this answers.
    pub tool_use_id: String,
    /// Tool output, or a human-readable error string.
    pub content: String,
}

/// One item of a structured turn payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentItem {
    Text { text: String },
    ToolUse(ToolInvocation),
    ToolResult(ToolResult),
}

/// The payload of a turn: plain text or a sequence of content items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnContent {
    Text(String),
    Items(Vec<ContentItem>),
}

/// One entry in a [`Conversation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    /// A plain-text user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    /// An assistant turn made of content items (text and tool requests).
    pub fn assistant(items: Vec<ContentItem>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Items(items),
        }
    }

    /// A user turn bundling tool results, in the given order.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Items(
                results.into_iter().map(ContentItem::ToolResult).collect(),
            ),
        }
    }

    /// Tool results carried by this turn, in order.
    pub fn results(&self) -> Vec<&ToolResult> {
        match &self.content {
            TurnContent::Items(items) => items
                .iter()
                .filter_map(|item| match item {
                    ContentItem::ToolResult(result) => Some(result),
                    _ => None,
                })
                .collect(),
            TurnContent::Text(_) => Vec::new(),
        }
    }
}

/// The ordered turns sent to the model on every call.
///
/// Starts with a single user turn and only ever grows by whole rounds:
/// one assistant turn followed by one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// A conversation holding only the user's question.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(query)],
        }
    }

    /// Append one completed round: the model's tool-request turn, then the
    /// user turn carrying the bundled results.
    pub fn push_round(&mut self, assistant: Turn, results: Turn) {
        debug_assert_eq!(assistant.role, Role::Assistant);
        debug_assert_eq!(results.role, Role::User);
        self.turns.push(assistant);
        self.turns.push(results);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// A tool that the model can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (e.g. "search_course_content").
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub parameters: serde_json::Value,
}

/// How the model may choose among offered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    Auto,
}

/// A single model call. Built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Model identifier (e.g. "claude-sonnet-4-20250514").
    pub model: String,
    /// System-level instructions.
    pub system: String,
    /// Conversation turns, oldest first.
    pub turns: Vec<Turn>,
    /// Tools offered on this call, if any.
    pub tools: Option<Vec<ToolDefinition>>,
    /// Present exactly when `tools` is.
    pub tool_choice: Option<ToolChoice>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// A final answer; no further tools requested.
    Normal,
    /// The turn carries one or more tool invocations.
    ToolRequested,
}

impl TerminationReason {
    /// Map a provider stop reason. Anything other than `tool_use` stops the
    /// loop.
    pub fn from_stop_reason(stop_reason: Option<&str>) -> Self {
        match stop_reason {
            Some("tool_use") => Self::ToolRequested,
            _ => Self::Normal,
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a model call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    /// Content items in the order the model produced them.
    pub content: Vec<ContentItem>,
    /// Normalised termination reason.
    pub termination: TerminationReason,
    /// Raw provider stop reason, kept for logging.
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
    /// Model identifier reported by the provider.
    pub model: String,
}

impl ModelResponse {
    /// Concatenated text blocks. Empty for a pure tool-request turn.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| match item {
                ContentItem::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool invocations, in the order the model listed them.
    pub fn tool_invocations(&self) -> Vec<&ToolInvocation> {
        self.content
            .iter()
            .filter_map(|item| match item {
                ContentItem::ToolUse(invocation) => Some(invocation),
                _ => None,
            })
            .collect()
    }

    /// Whether the loop should run a tool round for this response.
    ///
    /// A `tool_use` stop with no extractable invocations counts as a final
    /// answer.
    pub fn wants_tools(&self) -> bool {
        self.termination == TerminationReason::ToolRequested
            && self
                .content
                .iter()
                .any(|item| matches!(item, ContentItem::ToolUse(_)))
    }

    /// This response as an assistant turn, verbatim.
    pub fn to_assistant_turn(&self) -> Turn {
        Turn::assistant(self.content.clone())
    }
}
