//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, tool_definitions};
use crate::config::Settings;
use crate::error::{PalaverError, Result};
use crate::openai::create_chat_client;
use crate::tools::ToolRegistry;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Default system prompt for the agent.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can process various \
types of files and answer questions about them. For images, you can extract and analyze text \
content. For CSV files, you can perform data analysis and answer queries. For JSON files, you \
can help navigate and extract information.";

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of a conversation, as kept in session memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    fn to_request_message(&self) -> Result<ChatCompletionRequestMessage> {
        let message = match self.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(self.content.clone())
                .build()
                .map_err(|e| PalaverError::Agent(e.to_string()))?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(self.content.clone())
                .build()
                .map_err(|e| PalaverError::Agent(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(self.content.clone())
                .build()
                .map_err(|e| PalaverError::Agent(e.to_string()))?
                .into(),
        };
        Ok(message)
    }
}

/// Agent that answers with help from the registered tools.
pub struct Agent {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create an agent using the chat model and limits from `settings`.
    pub fn new(tools: Arc<ToolRegistry>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: create_chat_client(settings)?,
            model: settings.llm.model.clone(),
            temperature: settings.llm.temperature,
            max_tokens: settings.llm.max_tokens,
            tools,
            max_iterations: settings.agent.max_iterations,
            system_prompt: settings
                .agent
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Run the tool-calling loop over a prepared conversation.
    pub async fn run(&self, turns: &[ChatTurn]) -> Result<AgentResponse> {
        let mut messages = turns
            .iter()
            .map(ChatTurn::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let tools = tool_definitions(&self.tools);
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(PalaverError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request
                .model(&self.model)
                .messages(messages.clone())
                .temperature(self.temperature)
                .max_tokens(self.max_tokens);
            if !tools.is_empty() {
                request.tools(tools.clone());
            }
            let request = request
                .build()
                .map_err(|e| PalaverError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| PalaverError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| PalaverError::Agent("No response from model".to_string()))?;

            let tool_calls = match choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(AgentResponse {
                        content: choice.message.content.unwrap_or_default(),
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| PalaverError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in &tool_calls {
                let record = execute_tool_call(
                    &self.tools,
                    &tool_call.function.name,
                    &tool_call.function.arguments,
                )
                .await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| PalaverError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }
}

/// Execute a single tool call and return a record of it.
async fn execute_tool_call(tools: &ToolRegistry, name: &str, arguments: &str) -> ToolCallRecord {
    info!("Agent calling tool: {} with args: {}", name, arguments);

    let result = match parse_tool_call(name, arguments) {
        Ok(call) => match tools.execute(&call.name, &call.input).await {
            Ok(output) => output,
            Err(e) => format!("Tool error: {}", e),
        },
        Err(e) => format!("Failed to parse tool call: {}", e),
    };

    ToolCallRecord {
        name: name.to_string(),
        arguments: arguments.to_string(),
        result,
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::EchoTool;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo")));
        registry
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "weather_checker".to_string(),
            arguments: r#"{"input": "Oslo"}"#.to_string(),
            result: "Current weather in Oslo".to_string(),
        };
        assert_eq!(format!("{}", record), r#"weather_checker({"input": "Oslo"})"#);
    }

    #[tokio::test]
    async fn test_execute_tool_call() {
        let record = execute_tool_call(&registry(), "echo", r#"{"input": "hello"}"#).await;
        assert_eq!(record.name, "echo");
        assert_eq!(record.result, "echo says hello");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let record = execute_tool_call(&registry(), "shell_exec", r#"{"input": "1+1"}"#).await;
        assert_eq!(record.result, "Tool error: Unknown tool: shell_exec");
    }

    #[test]
    fn test_chat_turn_serde() {
        let turn: ChatTurn = serde_json::from_str(r#"{"role": "user", "content": "hi"}"#).unwrap();
        assert_eq!(turn, ChatTurn::user("hi"));
        assert!(ChatTurn::system("note").to_request_message().is_ok());
    }
}
