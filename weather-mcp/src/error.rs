//! Error types for the weather MCP server

use thiserror::Error;

use weather_core::{FailureKind, RegistryError};

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// JSON-RPC 2.0 and MCP error codes
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Errors from the frame transport
///
/// All of these end the session.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to read from the input stream
    #[error("read error: {0}")]
    Read(String),

    /// A frame could not be decoded; framing state is not recoverable
    #[error("decode error: {0}")]
    Decode(String),

    /// Failed to write or flush a response frame
    #[error("write error: {0}")]
    Write(String),
}

impl TransportError {
    /// JSON-RPC code reported to the client, where one applies
    pub fn error_code(&self) -> i32 {
        match self {
            TransportError::Decode(_) => error_codes::PARSE_ERROR,
            _ => error_codes::INTERNAL_ERROR,
        }
    }
}

/// Errors that stop the server
#[derive(Error, Debug)]
pub enum McpError {
    /// The capability catalog could not be registered
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The session transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// JSON-RPC code for a failed dispatch surfaced as a protocol error
pub fn failure_code(kind: FailureKind) -> i32 {
    match kind {
        FailureKind::UnknownCapability | FailureKind::InvalidArguments => error_codes::INVALID_PARAMS,
        FailureKind::HandlerError => error_codes::INTERNAL_ERROR,
    }
}
