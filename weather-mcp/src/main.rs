//! Weather MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Run as MCP server (stdio)
//! weather-mcp
//!
//! # Verbose logging (stderr)
//! WEATHER_MCP_LOG=debug weather-mcp
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_core::{CapabilityKind, Dispatcher};
use weather_mcp::{catalog, McpResult, McpServer, ServerConfig, SessionLoop, StdioTransport, SERVER_NAME};

#[derive(Debug, Parser)]
#[command(name = "weather-mcp", version, about = "Weather MCP server over stdio")]
struct Args {
    /// Server name reported to clients
    #[arg(long, env = "WEATHER_MCP_NAME", default_value = SERVER_NAME)]
    name: String,

    /// Tracing filter directives, e.g. `weather_mcp=debug`
    #[arg(long, env = "WEATHER_MCP_LOG")]
    log_filter: Option<String>,

    /// Instructions sent to the client during initialize
    #[arg(long, env = "WEATHER_MCP_INSTRUCTIONS")]
    instructions: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing (to stderr so it doesn't interfere with stdio MCP)
    let filter = match &args.log_filter {
        Some(directives) => tracing_subscriber::EnvFilter::new(directives),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "weather_mcp=info,weather_core=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, detail = ?e, "Weather MCP server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> McpResult<()> {
    tracing::info!("Starting weather MCP server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::builder()
        .name(args.name)
        .instructions(args.instructions)
        .build();

    let registry = catalog::build_registry()?;
    tracing::info!(
        tools = registry.list(CapabilityKind::Tool).len(),
        prompts = registry.list(CapabilityKind::Prompt).len(),
        "Registered capabilities"
    );

    let server = McpServer::new(Dispatcher::new(Arc::new(registry)), config);
    let transport = StdioTransport::new(tokio::io::stdin(), tokio::io::stdout());
    let mut session = SessionLoop::new(transport, server);

    tracing::info!("MCP server ready, listening on stdio");
    let end = session.run_until(shutdown_signal()).await?;
    tracing::info!(?end, "Weather MCP server stopped");

    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
