//! MCP Server protocol implementation
//!
//! Maps JSON-RPC 2.0 messages onto the capability dispatcher. Requests (with
//! an `id`) get exactly one response; notifications get none.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use weather_core::{Dispatcher, Registry};

use crate::config::ServerConfig;
use crate::error::error_codes;
use crate::{prompts, tools};

/// Protocol version used when the client does not ask for a supported one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Protocol versions this server will echo back during `initialize`
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// MCP JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPRequest {
    pub jsonrpc: String,
    /// `None` only when the member is absent; `"id": null` is `Some(Value::Null)`
    #[serde(default, deserialize_with = "present_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl MCPRequest {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params: Value::Null,
        }
    }

    /// Notifications carry no `id` and must not be answered
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Any `id` member that is present, `null` included, marks a request
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// MCP JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

impl MCPResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Error response; `id` is `null` when the request id is unknown
    pub fn error(id: Option<Value>, error: MCPError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.unwrap_or(Value::Null)),
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl MCPError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Text content block shared by tool results and prompt messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }
}

/// Weather MCP server: protocol routing over a capability dispatcher
#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: Dispatcher,
    config: ServerConfig,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        self.dispatcher.registry()
    }

    /// Handle one decoded message
    ///
    /// Returns `None` for notifications.
    pub fn handle_request(&self, request: MCPRequest) -> Option<MCPResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(MCPResponse::error(
                Some(id),
                MCPError::new(
                    error_codes::INVALID_REQUEST,
                    format!("Unsupported jsonrpc version: {}", request.jsonrpc),
                ),
            ));
        }

        debug!(method = %request.method, id = %id, "received request");

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize(&request.params)),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(tools::handle_tools_list(self.registry())),
            "tools/call" => tools::handle_tools_call(&self.dispatcher, request.params),
            "prompts/list" => Ok(prompts::handle_prompts_list(self.registry())),
            "prompts/get" => prompts::handle_prompts_get(&self.dispatcher, request.params),
            _ => Err(MCPError::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        Some(match result {
            Ok(value) => MCPResponse::success(id, value),
            Err(error) => MCPResponse::error(Some(id), error),
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => debug!("client initialized"),
            "notifications/cancelled" => debug!("client cancelled a request"),
            other => debug!(method = other, "ignoring notification"),
        }
    }

    fn handle_initialize(&self, params: &Value) -> Value {
        let requested = params.get("protocolVersion").and_then(Value::as_str);
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        if let Some(client) = params.get("clientInfo").and_then(|c| c.get("name")).and_then(Value::as_str) {
            debug!(client, protocol_version, "initialize");
        }

        let mut result = serde_json::json!({
            "protocolVersion": protocol_version,
            "serverInfo": {
                "name": self.config.name,
                "version": self.config.version
            },
            "capabilities": {
                "tools": { "listChanged": false },
                "prompts": { "listChanged": false }
            }
        });
        if let Some(instructions) = &self.config.instructions {
            result["instructions"] = Value::String(instructions.clone());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use serde_json::json;

    fn empty_server() -> McpServer {
        McpServer::new(
            Dispatcher::new(Arc::new(Registry::new())),
            ServerConfig::builder().name("test-server").build(),
        )
    }

    #[test]
    fn test_request_deserialization() {
        let request: MCPRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#).unwrap();
        assert_eq!(request.id, Some(json!(7)));
        assert_eq!(request.params, Value::Null);
        assert!(!request.is_notification());

        let notification: MCPRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(notification.is_notification());
    }

    #[test]
    fn test_null_id_is_a_request() {
        let request: MCPRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(request.id, Some(Value::Null));
        assert!(!request.is_notification());

        let response = empty_server().handle_request(request).unwrap();
        assert_eq!(response.result, Some(json!({})));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], Value::Null);
        assert!(json.as_object().unwrap().contains_key("id"));
    }

    #[test]
    fn test_error_response_has_null_id() {
        let response = MCPResponse::error(None, MCPError::new(error_codes::PARSE_ERROR, "bad"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], Value::Null);
        assert!(json.get("result").is_none());
        assert_eq!(json["error"]["code"], -32700);
    }

    #[test]
    fn test_initialize_echoes_supported_version() {
        let server = empty_server();
        let response = server
            .handle_request(MCPRequest::new(1, "initialize", json!({"protocolVersion": "2025-03-26"})))
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "test-server");
        assert!(result.get("instructions").is_none());
    }

    #[test]
    fn test_initialize_falls_back_to_default_version() {
        let server = empty_server();
        let response = server
            .handle_request(MCPRequest::new(1, "initialize", json!({"protocolVersion": "1999-01-01"})))
            .unwrap();
        assert_eq!(response.result.unwrap()["protocolVersion"], DEFAULT_PROTOCOL_VERSION);
    }

    #[test]
    fn test_notification_gets_no_response() {
        let server = empty_server();
        assert!(server
            .handle_request(MCPRequest::notification("notifications/initialized"))
            .is_none());
    }

    #[test]
    fn test_unknown_method() {
        let server = empty_server();
        let response = server
            .handle_request(MCPRequest::new("abc", "resources/list", Value::Null))
            .unwrap();
        assert_eq!(response.id, Some(json!("abc")));
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::METHOD_NOT_FOUND);
        assert_eq!(error.message, "Method not found: resources/list");
    }

    #[test]
    fn test_wrong_jsonrpc_version() {
        let server = empty_server();
        let mut request = MCPRequest::new(3, "ping", Value::Null);
        request.jsonrpc = "1.0".to_string();
        let response = server.handle_request(request).unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[test]
    fn test_ping() {
        let server = empty_server();
        let response = server.handle_request(MCPRequest::new(9, "ping", Value::Null)).unwrap();
        assert_eq!(response.result, Some(json!({})));
    }
}
