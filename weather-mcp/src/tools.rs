//! MCP `tools/*` methods

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use weather_core::{
    CapabilityDescriptor, CapabilityKind, Dispatcher, FailureKind, Output, ParamSpec, ParamType,
    ParamValue, Registry, Request, Response,
};

use crate::error::{error_codes, failure_code};
use crate::server::{Content, MCPError};

/// Tool call request
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Tool call response
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn from_descriptor(descriptor: &CapabilityDescriptor) -> Self {
        Self {
            name: descriptor.name().to_string(),
            description: descriptor.description().map(str::to_string),
            input_schema: input_schema(descriptor.parameters()),
        }
    }
}

/// JSON Schema object describing a parameter list
pub fn input_schema(parameters: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for spec in parameters {
        let mut property = json!({ "type": spec.param_type.json_schema_type() });
        if spec.param_type == ParamType::Messages {
            property["items"] = json!({
                "type": "object",
                "required": ["role", "content"],
                "properties": {
                    "role": { "type": "string", "enum": ["user", "assistant", "system"] },
                    "content": {
                        "oneOf": [
                            { "type": "string" },
                            {
                                "type": "object",
                                "required": ["text"],
                                "properties": {
                                    "type": { "type": "string", "enum": ["text"] },
                                    "text": { "type": "string" }
                                }
                            }
                        ]
                    }
                }
            });
        }
        if let Some(description) = &spec.description {
            property["description"] = Value::String(description.clone());
        }
        match &spec.default {
            Some(ParamValue::Unspecified) | None => {}
            Some(default) => property["default"] = json!(default),
        }
        if spec.is_required() {
            required.push(Value::String(spec.name.clone()));
        }
        properties.insert(spec.name.clone(), property);
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Raw arguments as a JSON object; absent or `null` means none
pub(crate) fn arguments_map(arguments: Value, method: &str) -> Result<Map<String, Value>, MCPError> {
    match arguments {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(MCPError::new(
            error_codes::INVALID_PARAMS,
            format!("{method} arguments must be an object, got {other}"),
        )),
    }
}

/// Handle `tools/list`
pub fn handle_tools_list(registry: &Registry) -> Value {
    let tools: Vec<ToolDefinition> = registry
        .list(CapabilityKind::Tool)
        .iter()
        .map(ToolDefinition::from_descriptor)
        .collect();

    json!({ "tools": tools })
}

/// Handle `tools/call`
///
/// Handler failures are reported inside the result with `isError: true` so
/// the client can show them; unknown tools and bad arguments are protocol
/// errors.
pub fn handle_tools_call(dispatcher: &Dispatcher, params: Value) -> Result<Value, MCPError> {
    let call: ToolCall = serde_json::from_value(params).map_err(|e| {
        MCPError::new(error_codes::INVALID_PARAMS, format!("invalid tools/call params: {e}"))
    })?;
    let arguments = arguments_map(call.arguments, "tools/call")?;

    let result = match dispatcher.dispatch(&Request::tool(call.name, arguments)) {
        Response::Success(output) => ToolResult {
            content: output_content(output),
            is_error: false,
        },
        Response::Failure(failure) if failure.kind == FailureKind::HandlerError => ToolResult {
            content: vec![Content::text(failure.message)],
            is_error: true,
        },
        Response::Failure(failure) => {
            return Err(MCPError::new(failure_code(failure.kind), failure.message)
                .with_data(json!({ "kind": failure.kind })));
        }
    };

    serde_json::to_value(result)
        .map_err(|e| MCPError::new(error_codes::INTERNAL_ERROR, e.to_string()))
}

fn output_content(output: Output) -> Vec<Content> {
    match output {
        Output::Text(text) => vec![Content::text(text)],
        Output::Messages(messages) => messages
            .into_iter()
            .map(|message| Content::text(message.content))
            .collect(),
    }
}
