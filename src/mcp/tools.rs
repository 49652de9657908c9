//! MCP tool definitions derived from the tool registry.

use super::protocol::Tool;
use crate::tools::ToolRegistry;
use serde_json::json;

/// Describe every registered tool for `tools/list`.
pub fn get_tools(registry: &ToolRegistry) -> Vec<Tool> {
    registry
        .iter()
        .map(|tool| Tool {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "The input for the tool"
                    }
                },
                "required": ["input"]
            }),
        })
        .collect()
}
