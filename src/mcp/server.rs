//! MCP server implementation.

use super::protocol::*;
use super::tools::get_tools;
use crate::agent::parse_tool_call;
use crate::config::Settings;
use crate::tools::ToolRegistry;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "palaver";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server exposing the Palaver tools.
pub struct McpServer {
    tools: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a server with every built-in tool.
    pub fn new(settings: &Settings) -> crate::Result<Self> {
        Ok(Self::with_registry(Arc::new(ToolRegistry::with_defaults(
            &settings.tools,
        )?)))
    }

    pub fn with_registry(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        // Logs go to stderr so they don't interfere with JSON-RPC
        info!("Palaver MCP server starting with {} tools", self.tools.len());

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    warn!("Failed to parse request: {}", e);
                    Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"))
                }
            };

            if let Some(response) = response {
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC request. Notifications get no response.
    pub(crate) async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("MCP request: {}", request.method);

        if request.is_notification() {
            return None;
        }

        if !request.is_valid_version() {
            return Some(JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                &format!("Invalid Request: unsupported jsonrpc version '{}'", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: get_tools(&self.tools),
        };
        JsonRpcResponse::from_result(id, &result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        &format!("Invalid params: {}", e),
                    )
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let arguments = params
            .arguments
            .map(|a| a.to_string())
            .unwrap_or_else(|| "{}".to_string());

        let result = match parse_tool_call(&params.name, &arguments) {
            Ok(call) => match self.tools.execute(&call.name, &call.input).await {
                Ok(output) if output.starts_with("Error") => ToolCallResult::error(output),
                Ok(output) => ToolCallResult::text(output),
                Err(e) => ToolCallResult::error(e.to_string()),
            },
            Err(e) => ToolCallResult::error(e.to_string()),
        };

        JsonRpcResponse::from_result(id, &result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::EchoTool;

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo")));
        McpServer::with_registry(Arc::new(registry))
    }

    fn request(line: &str) -> JsonRpcRequest {
        serde_json::from_str(line).unwrap()
    }

    async fn call(server: &McpServer, line: &str) -> Value {
        let response = server.handle_request(request(line)).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = call(&server(), r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).await;
        assert_eq!(response["result"]["serverInfo"]["name"], "palaver");
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = call(&server(), r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "input");
    }

    #[tokio::test]
    async fn test_tools_call() {
        let response = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"input":"hi"}}}"#,
        )
        .await;
        assert_eq!(response["result"]["content"][0]["text"], "echo says hi");
        assert!(response["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let response = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
        )
        .await;
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(response["result"]["content"][0]["text"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_unknown_method_and_notification() {
        let server = server();
        let response = call(&server, r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let notification = request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        assert!(server.handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_rejects_wrong_jsonrpc_version() {
        let server = server();
        let response = call(&server, r#"{"jsonrpc":"1.0","id":6,"method":"ping"}"#).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], 6);

        let response = call(&server, r#"{"id":7,"method":"ping"}"#).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }
}
