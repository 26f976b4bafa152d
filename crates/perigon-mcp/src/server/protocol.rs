//! JSON-RPC 2.0 types and MCP method dispatch shared by every transport.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::session::McpConnection;
use crate::error::DispatchError;
use crate::tools::ToolRegistry;

/// Protocol version offered when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC error codes.
pub mod codes {
    /// Invalid JSON.
    pub const PARSE_ERROR: i32 = -32700;
    /// Unknown method.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Unknown tool or invalid arguments.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Unexpected server failure.
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Missing or rejected credential.
    pub const AUTH_REQUIRED: i32 = -32001;
}

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version marker.
    #[serde(default)]
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Value,
    /// Request ID; absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Whether this is a notification (no response expected).
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version marker.
    pub jsonrpc: Cow<'static, str>,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Request ID echoed back.
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    const VERSION: &'static str = "2.0";

    /// Successful response.
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: Cow::Borrowed(Self::VERSION), result: Some(result), error: None, id }
    }

    /// Error response.
    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self::error_with_data(id, code, message, None)
    }

    /// Error response with structured details.
    #[must_use]
    pub fn error_with_data(
        id: Option<Value>,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data }),
            id,
        }
    }

    /// Map a dispatch failure to its JSON-RPC error.
    #[must_use]
    pub fn dispatch_error(id: Option<Value>, err: &DispatchError) -> Self {
        let code = match err {
            DispatchError::AuthenticationRequired => codes::AUTH_REQUIRED,
            DispatchError::UnknownTool { .. } | DispatchError::InvalidArguments(_) => {
                codes::INVALID_PARAMS
            }
        };
        let mut data = json!({"code": err.code()});
        if let Some(fields) = err.field_errors() {
            data["details"] = json!(fields);
        }
        Self::error_with_data(id, code, err.to_string(), Some(data))
    }
}

/// Handle one MCP request. Returns `None` for notifications.
pub async fn handle_request(
    req: &JsonRpcRequest,
    registry: &ToolRegistry,
    conn: &McpConnection,
) -> Option<JsonRpcResponse> {
    let id = req.id.clone();
    let response = match req.method.as_str() {
        "initialize" => {
            // Resolve gating up front so the first tools/list is fast.
            conn.visible_tools().await;
            JsonRpcResponse::success(id, initialize_result(&req.params))
        }
        "notifications/initialized" | "initialized" | "notifications/cancelled" => {
            JsonRpcResponse::success(id, json!({}))
        }
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => {
            let tools = registry.list_visible(conn.visible_tools().await);
            let tools: Vec<Value> = tools
                .into_iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "inputSchema": t.input_schema,
                    })
                })
                .collect();
            JsonRpcResponse::success(id, json!({"tools": tools}))
        }
        "tools/call" => handle_tools_call(id, &req.params, registry, conn).await,
        method => {
            JsonRpcResponse::error(id, codes::METHOD_NOT_FOUND, format!("Method not found: {method}"))
        }
    };

    if req.is_notification() { None } else { Some(response) }
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    tracing::info!(protocol_version, "MCP initialize");

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": "perigon-mcp",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn handle_tools_call(
    id: Option<Value>,
    params: &Value,
    registry: &ToolRegistry,
    conn: &McpConnection,
) -> JsonRpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing 'name' parameter");
    };
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    let visible = conn.visible_tools().await;
    if !visible.iter().any(|tool| tool.as_str() == name) {
        tracing::debug!(tool = %name, "Tool not visible to this session");
        return JsonRpcResponse::dispatch_error(id, &DispatchError::unknown_tool(name));
    }

    match registry.execute(name, &arguments, &conn.ctx).await {
        Ok(output) => match serde_json::to_value(&output) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize tool output");
                JsonRpcResponse::error(id, codes::INTERNAL_ERROR, "Internal error")
            }
        },
        Err(err) => JsonRpcResponse::dispatch_error(id, &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PerigonClient;
    use crate::config::Config;
    use crate::tools::{ToolContext, ToolName};

    fn conn() -> McpConnection {
        let client = PerigonClient::new(&Config::for_testing("http://127.0.0.1:9")).unwrap();
        McpConnection::with_tools(ToolContext::new(client), vec![ToolName::SearchNewsArticles])
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest { jsonrpc: "2.0".into(), method: method.into(), params, id: Some(json!(1)) }
    }

    #[tokio::test]
    async fn test_tools_list_is_gated() {
        let registry = ToolRegistry::new();
        let resp = handle_request(&request("tools/list", json!({})), &registry, &conn())
            .await
            .unwrap();
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "search_news_articles");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_hidden_tool_is_unknown() {
        let registry = ToolRegistry::new();
        let req = request("tools/call", json!({"name": "search_companies", "arguments": {}}));
        let resp = handle_request(&req, &registry, &conn()).await.unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, codes::INVALID_PARAMS);
        assert_eq!(error.data.unwrap()["code"], "TOOL_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_arguments_carry_field_details() {
        let registry = ToolRegistry::new();
        let req = request(
            "tools/call",
            json!({"name": "search_news_articles", "arguments": {"size": "lots"}}),
        );
        let resp = handle_request(&req, &registry, &conn()).await.unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, codes::INVALID_PARAMS);
        assert_eq!(error.data.unwrap()["details"][0]["field"], "size");
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let registry = ToolRegistry::new();
        let mut req = request("notifications/initialized", json!({}));
        req.id = None;
        assert!(handle_request(&req, &registry, &conn()).await.is_none());
    }

    #[test]
    fn test_auth_error_code() {
        let resp = JsonRpcResponse::dispatch_error(
            Some(json!(7)),
            &DispatchError::AuthenticationRequired,
        );
        assert_eq!(resp.error.unwrap().code, codes::AUTH_REQUIRED);
    }
}
