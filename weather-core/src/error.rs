//! Error types for capability registration, binding and dispatch
//!
//! Errors are split by the layer that raises them:
//! - [`RegistryError`] - registration and lookup (startup bugs, unknown names)
//! - [`BindingError`] - argument validation and coercion
//! - [`HandlerError`] - anything business logic returns
//!
//! The dispatcher folds all three into a [`FailureKind`] so that no failure
//! arising from a single request escapes to the session loop.
//!
//! Each variant has a stable error code (e.g. `MISSING_REQUIRED_ARGUMENT`)
//! suitable for logging and for client-side matching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::{CapabilityKind, ParamType};

/// Error raised by a handler; any error type converts into it with `?`
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from building descriptors or using the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A descriptor with the same kind and name already exists
    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: CapabilityKind, name: String },

    /// No descriptor with this kind and name
    #[error("{kind} '{name}' is not registered")]
    NotFound { kind: CapabilityKind, name: String },

    /// Descriptor schema breaks an invariant
    #[error("Invalid descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },
}

impl RegistryError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateName { .. } => "DUPLICATE_NAME",
            RegistryError::NotFound { .. } => "NOT_FOUND",
            RegistryError::InvalidDescriptor { .. } => "INVALID_DESCRIPTOR",
        }
    }
}

/// Argument binding failures
///
/// Every variant names the offending parameter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// Required parameter absent from the raw arguments
    #[error("missing required argument '{parameter}'")]
    MissingRequiredArgument { parameter: String },

    /// Raw value cannot be converted to the declared type
    #[error("argument '{parameter}' expected {expected}, got {actual}")]
    TypeCoercion {
        parameter: String,
        expected: ParamType,
        actual: String,
    },

    /// String is blank after trimming and the parameter forbids that
    #[error("argument '{parameter}' cannot be empty")]
    EmptyValue { parameter: String },
}

impl BindingError {
    /// Name of the parameter that failed to bind
    pub fn parameter(&self) -> &str {
        match self {
            BindingError::MissingRequiredArgument { parameter }
            | BindingError::TypeCoercion { parameter, .. }
            | BindingError::EmptyValue { parameter } => parameter,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            BindingError::MissingRequiredArgument { .. } => "MISSING_REQUIRED_ARGUMENT",
            BindingError::TypeCoercion { .. } => "TYPE_COERCION",
            BindingError::EmptyValue { .. } => "EMPTY_VALUE",
        }
    }
}

/// Classification of a failed dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Lookup found no capability of that kind and name
    UnknownCapability,
    /// Binding rejected the arguments
    InvalidArguments,
    /// The handler returned an error or panicked
    HandlerError,
}

impl FailureKind {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::UnknownCapability => "UNKNOWN_CAPABILITY",
            FailureKind::InvalidArguments => "INVALID_ARGUMENTS",
            FailureKind::HandlerError => "HANDLER_ERROR",
        }
    }

    /// Whether the client caused this failure (as opposed to the handler)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FailureKind::HandlerError)
    }
}
