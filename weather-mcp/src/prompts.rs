//! MCP `prompts/*` methods

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use weather_core::{CapabilityDescriptor, CapabilityKind, Dispatcher, Message, Output, Registry, Request, Response, Role};

use crate::error::{error_codes, failure_code};
use crate::server::{Content, MCPError};
use crate::tools::arguments_map;

/// Prompt get request
#[derive(Debug, Clone, Deserialize)]
pub struct PromptGet {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Prompt definition for MCP protocol
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub arguments: Vec<PromptArgument>,
}

/// One argument of a prompt
#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
}

impl PromptDefinition {
    pub fn from_descriptor(descriptor: &CapabilityDescriptor) -> Self {
        Self {
            name: descriptor.name().to_string(),
            description: descriptor.description().map(str::to_string),
            arguments: descriptor
                .parameters()
                .iter()
                .map(|spec| PromptArgument {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    required: spec.is_required(),
                })
                .collect(),
        }
    }
}

/// A rendered prompt message
#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: Content,
}

impl From<Message> for PromptMessage {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            content: Content::text(message.content),
        }
    }
}

/// Prompt get response
#[derive(Debug, Clone, Serialize)]
pub struct PromptResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

/// Handle `prompts/list`
pub fn handle_prompts_list(registry: &Registry) -> Value {
    let prompts: Vec<PromptDefinition> = registry
        .list(CapabilityKind::Prompt)
        .iter()
        .map(PromptDefinition::from_descriptor)
        .collect();

    json!({ "prompts": prompts })
}

/// Handle `prompts/get`
///
/// A plain-text prompt becomes a single `user` message.
pub fn handle_prompts_get(dispatcher: &Dispatcher, params: Value) -> Result<Value, MCPError> {
    let get: PromptGet = serde_json::from_value(params).map_err(|e| {
        MCPError::new(error_codes::INVALID_PARAMS, format!("invalid prompts/get params: {e}"))
    })?;
    let arguments = arguments_map(get.arguments, "prompts/get")?;

    let description = dispatcher
        .registry()
        .lookup(CapabilityKind::Prompt, &get.name)
        .ok()
        .and_then(|d| d.description().map(str::to_string));

    let messages = match dispatcher.dispatch(&Request::prompt(get.name, arguments)) {
        Response::Success(Output::Text(text)) => vec![PromptMessage::from(Message::user(text))],
        Response::Success(Output::Messages(messages)) => {
            messages.into_iter().map(PromptMessage::from).collect()
        }
        Response::Failure(failure) => {
            return Err(MCPError::new(failure_code(failure.kind), failure.message)
                .with_data(json!({ "kind": failure.kind })));
        }
    };

    serde_json::to_value(PromptResult { description, messages })
        .map_err(|e| MCPError::new(error_codes::INTERNAL_ERROR, e.to_string()))
}
