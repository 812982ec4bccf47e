//! Scripted model provider and recording tool dispatcher.
//!
//! [`ScriptedProvider`] replays a fixed sequence of model outcomes and keeps
//! every request it receives, so tests can assert on exactly what the
//! generator sent. [`RecordingDispatcher`] does the same for tool calls.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use coursemind_core::BoxFuture;
use coursemind_core::llm::{
    ContentItem, LlmError, LlmProvider, ModelRequest, ModelResponse, TerminationReason,
    TokenUsage, ToolInvocation,
};
use coursemind_core::tools::{ToolDispatcher, ToolError};
use serde_json::Value;

// ── Response builders ────────────────────────────────────────────────────

/// A response with the given content and raw stop reason.
pub fn response(content: Vec<ContentItem>, stop_reason: Option<&str>) -> ModelResponse {
    ModelResponse {
        content,
        termination: TerminationReason::from_stop_reason(stop_reason),
        stop_reason: stop_reason.map(str::to_string),
        usage: TokenUsage::default(),
        model: "scripted".to_string(),
    }
}

/// A final text answer (`end_turn`).
pub fn text_response(text: &str) -> ModelResponse {
    response(
        vec![ContentItem::Text {
            text: text.to_string(),
        }],
        Some("end_turn"),
    )
}

/// A tool invocation with the given correlation id.
pub fn invocation(id: &str, name: &str, arguments: Value) -> ToolInvocation {
    ToolInvocation {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

/// A `tool_use` response requesting the given invocations, in order.
pub fn tool_use_response(invocations: Vec<ToolInvocation>) -> ModelResponse {
    response(
        invocations.into_iter().map(ContentItem::ToolUse).collect(),
        Some("tool_use"),
    )
}

// ── ScriptedProvider ─────────────────────────────────────────────────────

/// A model provider that replays scripted outcomes in order.
///
/// Once the script runs out it keeps returning the `repeat` response if one
/// was given, and a request error otherwise.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ModelResponse, LlmError>>>,
    repeat: Option<ModelResponse>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    /// Replay `script`, successes and failures alike.
    pub fn new(script: Vec<Result<ModelResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replay successful responses only.
    pub fn replying(responses: Vec<ModelResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    /// Answer every call with the same response.
    pub fn repeating(response: ModelResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::new(Vec::new())
        }
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn next(&self) -> Result<ModelResponse, LlmError> {
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match (scripted, &self.repeat) {
            (Some(outcome), _) => outcome,
            (None, Some(response)) => Ok(response.clone()),
            (None, None) => Err(LlmError::Request("script exhausted".to_string())),
        }
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn chat(&self, request: &ModelRequest) -> BoxFuture<'_, Result<ModelResponse, LlmError>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let outcome = self.next();
        Box::pin(async move { outcome })
    }
}

// ── RecordingDispatcher ──────────────────────────────────────────────────

/// One tool call seen by a [`RecordingDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub name: String,
    pub arguments: Value,
}

/// A tool dispatcher that returns scripted outcomes and records every call.
///
/// `Err(message)` outcomes are returned as [`ToolError::Execution`], whose
/// display is the bare message.
pub struct RecordingDispatcher {
    outcomes: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<Result<String, String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingDispatcher {
    /// Return `outcomes` in call order, then fail every further call.
    pub fn scripted(outcomes: Vec<Result<String, String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Succeed with `output` on every call.
    pub fn returning(output: &str) -> Self {
        Self {
            fallback: Some(Ok(output.to_string())),
            ..Self::scripted(Vec::new())
        }
    }

    /// Fail with `message` on every call.
    pub fn failing(message: &str) -> Self {
        Self {
            fallback: Some(Err(message.to_string())),
            ..Self::scripted(Vec::new())
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next(&self) -> Result<String, String> {
        let scripted = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        scripted
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err("no scripted tool result".to_string()))
    }
}

impl ToolDispatcher for RecordingDispatcher {
    fn execute<'a>(
        &'a self,
        name: &'a str,
        arguments: &'a Value,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                name: name.to_string(),
                arguments: arguments.clone(),
            });
        let outcome = self.next().map_err(ToolError::Execution);
        Box::pin(async move { outcome })
    }
}
