//! Tool layer — the capabilities the model can invoke mid-conversation.
//!
//! The [`Generator`](crate::Generator) only sees the [`ToolDispatcher`]
//! trait: a name plus JSON arguments in, text or a [`ToolError`] out.
//! [`ToolRegistry`] is the bundled dispatcher; it routes calls to registered
//! [`Tool`]s and collects the sources they cite.

mod outline;
mod search;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::BoxFuture;
use crate::catalog::CatalogError;
use crate::llm::ToolDefinition;

pub use outline::CourseOutlineTool;
pub use search::CourseSearchTool;

/// Errors from tool execution.
///
/// The generator never propagates these; it turns them into text the model
/// can read.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Execution(String),
}

/// Executes tool invocations by name.
pub trait ToolDispatcher: Send + Sync {
    /// Run the named tool with the given arguments (a JSON object).
    fn execute<'a>(
        &'a self,
        name: &'a str,
        arguments: &'a Value,
    ) -> BoxFuture<'a, Result<String, ToolError>>;
}

/// A citation recorded by a tool for content it returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A single tool the model can call.
pub trait Tool: Send + Sync {
    /// Name, description and parameter schema offered to the model.
    fn definition(&self) -> ToolDefinition;

    fn execute<'a>(&'a self, arguments: &'a Value) -> BoxFuture<'a, Result<String, ToolError>>;

    /// Sources cited by this tool's results so far.
    fn sources(&self) -> Vec<Source> {
        Vec::new()
    }
}

/// Registry of tools, dispatching by name.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool under its definition's name, replacing any previous
    /// tool of that name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// All tool definitions (for sending to the model), sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Sources cited by every registered tool, in tool-name order, without
    /// duplicates.
    pub fn sources(&self) -> Vec<Source> {
        let mut sources: Vec<Source> = Vec::new();
        for name in self.names() {
            for source in self.tools[&name].sources() {
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
        }
        sources
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolDispatcher for ToolRegistry {
    fn execute<'a>(
        &'a self,
        name: &'a str,
        arguments: &'a Value,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(arguments),
            None => Box::pin(async move { Err(ToolError::UnknownTool(name.to_string())) }),
        }
    }
}

// ── Argument helpers ─────────────────────────────────────────────────────

fn invalid(tool: &str, reason: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: reason.into(),
    }
}

fn arguments_object<'a>(
    tool: &str,
    arguments: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, ToolError> {
    arguments
        .as_object()
        .ok_or_else(|| invalid(tool, "arguments must be a JSON object"))
}

fn required_str<'a>(tool: &str, arguments: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match arguments_object(tool, arguments)?.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(invalid(tool, format!("`{key}` must be a string"))),
        None => Err(invalid(tool, format!("missing required argument `{key}`"))),
    }
}

fn optional_str<'a>(
    tool: &str,
    arguments: &'a Value,
    key: &str,
) -> Result<Option<&'a str>, ToolError> {
    match arguments_object(tool, arguments)?.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(invalid(tool, format!("`{key}` must be a string"))),
    }
}

fn optional_u32(tool: &str, arguments: &Value, key: &str) -> Result<Option<u32>, ToolError> {
    match arguments_object(tool, arguments)?.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(tool, format!("`{key}` must be a non-negative integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".to_string(),
                description: "Echo the `text` argument.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {"text": {"type": "string"}},
                    "required": ["text"]
                }),
            }
        }

        fn execute<'a>(&'a self, arguments: &'a Value) -> BoxFuture<'a, Result<String, ToolError>> {
            Box::pin(async move { required_str("echo", arguments, "text").map(str::to_string) })
        }

        fn sources(&self) -> Vec<Source> {
            vec![Source {
                title: "Echo chamber".to_string(),
                link: None,
            }]
        }
    }

    #[test]
    fn test_empty_registry() {
        let reg = ToolRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.names().is_empty());
        assert!(reg.definitions().is_empty());
        assert!(reg.sources().is_empty());
    }

    #[test]
    fn test_register_and_get() {
        let mut reg = ToolRegistry::new();
        reg.register(Box::new(EchoTool));
        assert_eq!(reg.names(), vec!["echo".to_string()]);
        assert!(reg.get("echo").is_some());
        assert!(reg.get("missing").is_none());
        assert_eq!(reg.definitions()[0].name, "echo");
    }

    #[tokio::test]
    async fn test_dispatch_to_registered_tool() {
        let mut reg = ToolRegistry::new();
        reg.register(Box::new(EchoTool));
        let out = reg.execute("echo", &json!({"text": "hi"})).await.unwrap();
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let reg = ToolRegistry::new();
        let err = reg.execute("nope", &json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref n) if n == "nope"));
        assert_eq!(err.to_string(), "unknown tool: nope");
    }

    #[tokio::test]
    async fn test_dispatch_invalid_arguments() {
        let mut reg = ToolRegistry::new();
        reg.register(Box::new(EchoTool));

        let err = reg.execute("echo", &json!({})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments for echo: missing required argument `text`"
        );

        let err = reg.execute("echo", &json!("text")).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_sources_are_deduplicated() {
        struct OtherEcho;
        impl Tool for OtherEcho {
            fn definition(&self) -> ToolDefinition {
                ToolDefinition {
                    name: "echo_again".to_string(),
                    ..EchoTool.definition()
                }
            }
            fn execute<'a>(
                &'a self,
                arguments: &'a Value,
            ) -> BoxFuture<'a, Result<String, ToolError>> {
                Box::pin(async move {
                    required_str("echo_again", arguments, "text").map(str::to_string)
                })
            }
            fn sources(&self) -> Vec<Source> {
                EchoTool.sources()
            }
        }

        let mut reg = ToolRegistry::new();
        reg.register(Box::new(EchoTool));
        reg.register(Box::new(OtherEcho));
        assert_eq!(reg.sources().len(), 1);
    }

    #[test]
    fn test_optional_u32_parsing() {
        let args = json!({"n": 3, "neg": -1, "s": "3", "null": null});
        assert_eq!(optional_u32("t", &args, "n").unwrap(), Some(3));
        assert_eq!(optional_u32("t", &args, "missing").unwrap(), None);
        assert_eq!(optional_u32("t", &args, "null").unwrap(), None);
        assert!(optional_u32("t", &args, "neg").is_err());
        assert!(optional_u32("t", &args, "s").is_err());
    }
}
