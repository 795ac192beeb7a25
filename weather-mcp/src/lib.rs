//! Weather MCP Server Library
//!
//! Exposes weather tools and prompts to an MCP client over line-delimited
//! JSON-RPC on stdio.
//!
//! ## Architecture
//!
//! ```text
//! MCP client (Claude Desktop, etc.)
//!        │  stdin / stdout
//!        ▼
//! ┌─────────────────────┐
//! │  StdioTransport     │  one JSON-RPC message per line
//! ├─────────────────────┤
//! │  SessionLoop        │  decode → handle → encode, one at a time
//! ├─────────────────────┤
//! │  McpServer          │  initialize, ping, tools/*, prompts/*
//! └─────────┬───────────┘
//!           ▼
//! ┌─────────────────────┐
//! │    weather-core     │  Registry │ ArgumentBinder │ Dispatcher
//! └─────────┬───────────┘
//!           ▼
//!   catalog: get_weather, weather_inquiry, weather_travel_advice
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use weather_core::Dispatcher;
//! use weather_mcp::{catalog, McpServer, ServerConfig, SessionLoop, StdioTransport};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let registry = catalog::build_registry().unwrap();
//!     let server = McpServer::new(Dispatcher::new(Arc::new(registry)), ServerConfig::default());
//!     let transport = StdioTransport::new(tokio::io::stdin(), tokio::io::stdout());
//!
//!     SessionLoop::new(transport, server).run().await.unwrap();
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod prompts;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;

pub use config::ServerConfig;
pub use error::{McpError, McpResult, TransportError};
pub use server::{MCPError, MCPRequest, MCPResponse, McpServer};
pub use session::{SessionEnd, SessionLoop, SessionState};
pub use transport::{Frame, StdioTransport, Transport};

/// Server metadata for MCP protocol
pub const SERVER_NAME: &str = "weather-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
