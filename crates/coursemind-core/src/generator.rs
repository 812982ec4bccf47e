//! Bounded multi-round tool-augmented generation.
//!
//! One [`Generator::generate`] call answers one query:
//!
//! 1. the model is called once with the question, the system instructions
//!    and (when offered) the tool schemas;
//! 2. while the model asks for tools, tools were offered and a dispatcher
//!    is present, every requested tool is executed in order, the request
//!    and its results are appended to the conversation as one round, and
//!    the model is called again;
//! 3. after [`MAX_TOOL_ROUNDS`] rounds the model is called without tool
//!    schemas and whatever it says is the answer.
//!
//! So a query costs at most `1 + MAX_TOOL_ROUNDS` model calls. Tool failures
//! and model failures inside a round never surface as errors: they become
//! text, either for the model to read or as the returned answer.

use std::sync::Arc;

use coursemind_config::LlmConfig;
use tracing::{debug, info, warn};

use crate::llm::{
    Conversation, LlmError, LlmProvider, ModelRequest, ModelResponse, ToolChoice,
    ToolDefinition, ToolResult, Turn,
};
use crate::prompt::system_instructions;
use crate::tools::ToolDispatcher;

/// Maximum number of tool rounds per query.
pub const MAX_TOOL_ROUNDS: u32 = 2;

/// Errors returned by [`Generator::generate`].
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The first model call failed; there is nothing to answer with.
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),
}

/// Drives a query through the model and its tools.
///
/// Holds no per-query state, so one generator can serve concurrent queries.
pub struct Generator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl Generator {
    /// A generator with deterministic sampling and an 800-token answer cap.
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 800,
            temperature: 0.0,
        }
    }

    /// A generator using the model settings from the `[llm]` section.
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `query`, letting the model use tools for up to
    /// [`MAX_TOOL_ROUNDS`] rounds.
    ///
    /// Tools are only offered when `tools` is non-empty, and the tool loop
    /// only runs when tools were offered and `dispatcher` is given. Only a
    /// failure of the first model call is an `Err`.
    pub async fn generate(
        &self,
        query: &str,
        prior_conversation: Option<&str>,
        tools: Option<&[ToolDefinition]>,
        dispatcher: Option<&dyn ToolDispatcher>,
    ) -> Result<String, GenerateError> {
        let system = system_instructions(prior_conversation);
        let tools = tools.filter(|t| !t.is_empty());
        let mut conversation = Conversation::new(query);

        let mut response = self.call(&system, &conversation, tools).await?;

        // A model that was never offered tools cannot be sent tool turns.
        let (Some(dispatcher), Some(_)) = (dispatcher, tools) else {
            return Ok(response.text());
        };

        let mut round = 1;
        while response.wants_tools() {
            let results = execute_tools(dispatcher, &response).await;
            conversation.push_round(response.to_assistant_turn(), Turn::tool_results(results));

            // The last round's call must produce an answer.
            let offered = if round < MAX_TOOL_ROUNDS { tools } else { None };
            response = match self.call(&system, &conversation, offered).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(round, error = %err, "Model call failed during tool round");
                    return Ok(format!("Error during tool execution round {round}: {err}"));
                }
            };

            if round == MAX_TOOL_ROUNDS {
                if response.wants_tools() {
                    warn!(
                        rounds = MAX_TOOL_ROUNDS,
                        "Tool round budget exhausted; returning last response text"
                    );
                }
                break;
            }
            round += 1;
        }

        let answer = response.text();
        info!(
            turns = conversation.len(),
            answer_len = answer.len(),
            "Generation complete"
        );
        Ok(answer)
    }

    /// One model call over a freshly built request.
    async fn call(
        &self,
        system: &str,
        conversation: &Conversation,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ModelResponse, LlmError> {
        let request = self.request(system, conversation, tools);
        debug!(
            model = %request.model,
            turns = request.turns.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "Calling model"
        );
        let response = self.provider.chat(&request).await?;
        debug!(
            stop_reason = response.stop_reason.as_deref().unwrap_or("none"),
            input_tokens = response.usage.prompt_tokens,
            output_tokens = response.usage.completion_tokens,
            "Model responded"
        );
        Ok(response)
    }

    fn request(
        &self,
        system: &str,
        conversation: &Conversation,
        tools: Option<&[ToolDefinition]>,
    ) -> ModelRequest {
        ModelRequest {
            model: self.model.clone(),
            system: system.to_string(),
            turns: conversation.turns().to_vec(),
            tools: tools.map(<[ToolDefinition]>::to_vec),
            tool_choice: tools.map(|_| ToolChoice::Auto),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Execute every requested tool in order, one at a time.
async fn execute_tools(
    dispatcher: &dyn ToolDispatcher,
    response: &ModelResponse,
) -> Vec<ToolResult> {
    let mut results = Vec::new();
    for invocation in response.tool_invocations() {
        debug!(tool = %invocation.name, id = %invocation.id, "Executing tool");
        let content = match dispatcher
            .execute(&invocation.name, &invocation.arguments)
            .await
        {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = %invocation.name, error = %err, "Tool execution failed");
                format!("Error executing tool: {err}")
            }
        };
        results.push(ToolResult {
            tool_use_id: invocation.id.clone(),
            content,
        });
    }
    results
}
