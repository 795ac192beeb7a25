//! Capability descriptors
//!
//! A [`CapabilityDescriptor`] is the immutable metadata for one tool or
//! prompt: its name, its ordered parameter schema, the kind of value it
//! returns, and the handler that implements it. Descriptors are assembled
//! with [`DescriptorBuilder`], which rejects schemas that break the
//! required/default invariants before they can reach a registry.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binder::BoundArguments;
use crate::error::{HandlerError, RegistryError};

/// The two families of named capabilities a server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// Callable function returning text
    Tool,
    /// Text or message template
    Prompt,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Tool => f.write_str("tool"),
            CapabilityKind::Prompt => f.write_str("prompt"),
        }
    }
}

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Float,
    Boolean,
    /// Ordered list of role-tagged messages
    Messages,
}

impl ParamType {
    /// JSON Schema `type` keyword for this parameter type
    pub fn json_schema_type(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Float => "number",
            ParamType::Boolean => "boolean",
            ParamType::Messages => "array",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Float => "float",
            ParamType::Boolean => "boolean",
            ParamType::Messages => "message list",
        };
        f.write_str(name)
    }
}

/// Speaker of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Parse a role name, ignoring case
    pub fn parse(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
            Role::System => f.write_str("system"),
        }
    }
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// A bound (or default) parameter value
///
/// `Unspecified` is the sentinel an optional parameter may declare as its
/// default when "no value" is meaningful to the handler. It is accepted as a
/// default for any [`ParamType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Unspecified,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Messages(Vec<Message>),
}

impl ParamValue {
    /// The declared type this value satisfies, `None` for `Unspecified`
    pub fn param_type(&self) -> Option<ParamType> {
        match self {
            ParamValue::Unspecified => None,
            ParamValue::String(_) => Some(ParamType::String),
            ParamValue::Integer(_) => Some(ParamType::Integer),
            ParamValue::Float(_) => Some(ParamType::Float),
            ParamValue::Boolean(_) => Some(ParamType::Boolean),
            ParamValue::Messages(_) => Some(ParamType::Messages),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, ParamValue::Unspecified)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_messages(&self) -> Option<&[Message]> {
        match self {
            ParamValue::Messages(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

/// What a capability declares it returns
///
/// Documentation only: prompt handlers may return either shape at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    Text,
    Messages,
}

/// Value produced by a successful handler call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Output {
    Text(String),
    Messages(Vec<Message>),
}

impl Output {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(t) => Some(t),
            Output::Messages(_) => None,
        }
    }

    pub fn as_messages(&self) -> Option<&[Message]> {
        match self {
            Output::Text(_) => None,
            Output::Messages(m) => Some(m),
        }
    }
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Output::Text(value)
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Output::Text(value.to_string())
    }
}

impl From<Vec<Message>> for Output {
    fn from(value: Vec<Message>) -> Self {
        Output::Messages(value)
    }
}

/// Result returned by every handler
pub type HandlerResult = Result<Output, HandlerError>;

/// Business logic behind a capability
///
/// Handlers are invoked synchronously with arguments that have already been
/// validated against the descriptor's schema. Plain closures and functions
/// with the matching signature implement this trait.
pub trait Handler: Send + Sync {
    fn call(&self, args: &BoundArguments) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&BoundArguments) -> HandlerResult + Send + Sync,
{
    fn call(&self, args: &BoundArguments) -> HandlerResult {
        self(args)
    }
}

/// One declared parameter of a capability
///
/// A parameter is required exactly when it has no default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub default: Option<ParamValue>,
    /// Accept strings that are empty after trimming
    pub allow_empty: bool,
    pub description: Option<String>,
}

impl ParamSpec {
    /// A parameter the caller must supply
    pub fn required(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            default: None,
            allow_empty: false,
            description: None,
        }
    }

    /// A parameter that falls back to `default` when omitted
    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        default: impl Into<ParamValue>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            default: Some(default.into()),
            allow_empty: false,
            description: None,
        }
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Immutable metadata for a registered tool or prompt
#[derive(Clone)]
pub struct CapabilityDescriptor {
    name: String,
    kind: CapabilityKind,
    description: Option<String>,
    parameters: Vec<ParamSpec>,
    return_kind: ReturnKind,
    handler: Arc<dyn Handler>,
}

impl CapabilityDescriptor {
    /// Start building a tool descriptor
    pub fn tool(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(CapabilityKind::Tool, name)
    }

    /// Start building a prompt descriptor
    pub fn prompt(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(CapabilityKind::Prompt, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[ParamSpec] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn return_kind(&self) -> ReturnKind {
        self.return_kind
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Call the handler with already-bound arguments
    pub fn invoke(&self, args: &BoundArguments) -> HandlerResult {
        self.handler.call(args)
    }
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("return_kind", &self.return_kind)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CapabilityDescriptor`]
pub struct DescriptorBuilder {
    name: String,
    kind: CapabilityKind,
    description: Option<String>,
    parameters: Vec<ParamSpec>,
    return_kind: ReturnKind,
    handler: Option<Arc<dyn Handler>>,
}

impl DescriptorBuilder {
    fn new(kind: CapabilityKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            parameters: Vec::new(),
            return_kind: ReturnKind::Text,
            handler: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a parameter; declaration order is binding order
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn returns(mut self, return_kind: ReturnKind) -> Self {
        self.return_kind = return_kind;
        self
    }

    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Use a handler that is already shared
    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Validate the schema and produce the descriptor
    pub fn build(self) -> Result<CapabilityDescriptor, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidDescriptor {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("capability name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for spec in &self.parameters {
            if spec.name.trim().is_empty() {
                return Err(invalid("parameter name must not be empty".to_string()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(invalid(format!("duplicate parameter '{}'", spec.name)));
            }
            if let Some(default) = &spec.default {
                if let Some(actual) = default.param_type() {
                    if actual != spec.param_type {
                        return Err(invalid(format!(
                            "default for '{}' is {}, declared {}",
                            spec.name, actual, spec.param_type
                        )));
                    }
                }
            }
        }

        let Some(handler) = self.handler.clone() else {
            return Err(invalid("no handler supplied".to_string()));
        };

        Ok(CapabilityDescriptor {
            name: self.name,
            kind: self.kind,
            description: self.description,
            parameters: self.parameters,
            return_kind: self.return_kind,
            handler,
        })
    }
}
