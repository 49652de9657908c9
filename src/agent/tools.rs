//! Bridging registry tools to OpenAI function calling.

use crate::error::{PalaverError, Result};
use crate::tools::ToolRegistry;
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

/// Get OpenAI function/tool definitions for every registered tool.
///
/// All tools take one string, so each definition has a single required
/// `input` parameter.
pub fn tool_definitions(registry: &ToolRegistry) -> Vec<ChatCompletionTool> {
    registry
        .iter()
        .map(|tool| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: tool.name().to_string(),
                description: Some(tool.description().to_string()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "input": {
                            "type": "string",
                            "description": "The input to pass to the tool"
                        }
                    },
                    "required": ["input"]
                })),
                strict: None,
            },
        })
        .collect()
}

/// A tool call resolved to a tool name and its text input.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub input: String,
}

/// Parse a tool call from the OpenAI response format.
///
/// Uses the `input` argument when present; otherwise the raw arguments are
/// handed to the tool as-is.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    if name.is_empty() {
        return Err(PalaverError::Agent("Tool call without a name".to_string()));
    }

    let input = match serde_json::from_str::<serde_json::Value>(arguments) {
        Ok(args) => match args.get("input") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => arguments.to_string(),
        },
        Err(_) => arguments.to_string(),
    };

    Ok(ToolCall {
        name: name.to_string(),
        input,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::EchoTool;
    use std::sync::Arc;

    #[test]
    fn test_parse_input_argument() {
        let call = parse_tool_call("weather_checker", r#"{"input": "Oslo"}"#).unwrap();
        assert_eq!(call.name, "weather_checker");
        assert_eq!(call.input, "Oslo");
    }

    #[test]
    fn test_parse_passes_raw_arguments() {
        let args = r#"{"path": "data.csv", "operation": "columns"}"#;
        let call = parse_tool_call("csv_processor", args).unwrap();
        assert_eq!(call.input, args);
    }

    #[test]
    fn test_parse_non_json_arguments() {
        let call = parse_tool_call("wikipedia", "Alan Turing").unwrap();
        assert_eq!(call.input, "Alan Turing");
    }

    #[test]
    fn test_parse_non_string_input() {
        let call = parse_tool_call("json_processor", r#"{"input": {"path": "a.json"}}"#).unwrap();
        assert_eq!(call.input, r#"{"path":"a.json"}"#);
    }

    #[test]
    fn test_parse_requires_name() {
        assert!(parse_tool_call("", "{}").is_err());
    }

    #[test]
    fn test_definitions_follow_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("first")));
        registry.register(Arc::new(EchoTool("second")));

        let defs = tool_definitions(&registry);
        let names: Vec<_> = defs.iter().map(|d| d.function.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);

        let params = defs[0].function.parameters.as_ref().unwrap();
        assert_eq!(params["required"][0], "input");
        assert_eq!(defs[0].function.description.as_deref(), Some("Echo the input back."));
    }
}
