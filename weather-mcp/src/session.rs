//! Session loop
//!
//! Serves one client for the lifetime of the transport:
//!
//! ```text
//! Idle ──► AwaitingRequest ──frame──► Processing ──response flushed──┐
//!               ▲   │                     │                          │
//!               │   │ EOF / decode error  │ write failure            │
//!               │   │ / stop signal       ▼                          │
//!               │   └──────────────► Terminating                     │
//!               └────────────────────────────────────────────────────┘
//! ```
//!
//! Requests are handled strictly one at a time. Dispatch failures never
//! leave `Processing` for `Terminating`; only transport failures do. The
//! transport is closed on every exit path.

use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::error::TransportError;
use crate::server::{MCPError, MCPResponse, McpServer};
use crate::transport::{Frame, Transport};

/// Where the loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingRequest,
    Processing,
    Terminating,
}

/// Why a session ended cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed the stream
    EndOfStream,
    /// The process was asked to stop
    Shutdown,
}

/// Owns the transport and feeds requests to the server one at a time
pub struct SessionLoop<T> {
    transport: T,
    server: McpServer,
    state: SessionState,
    requests_served: u64,
}

impl<T: Transport> SessionLoop<T> {
    pub fn new(transport: T, server: McpServer) -> Self {
        Self {
            transport,
            server,
            state: SessionState::Idle,
            requests_served: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Messages fully processed so far, notifications included
    pub fn requests_served(&self) -> u64 {
        self.requests_served
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Serve until the stream ends or a transport error occurs
    pub async fn run(&mut self) -> Result<SessionEnd, TransportError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Serve until the stream ends, a transport error occurs, or `shutdown`
    /// completes while waiting for the next request
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<SessionEnd, TransportError>
    where
        F: Future<Output = ()>,
    {
        let outcome = self.serve(shutdown).await;
        self.state = SessionState::Terminating;

        if let Err(e) = self.transport.close().await {
            warn!(error = %e, "failed to close transport");
        }

        match &outcome {
            Ok(end) => info!(?end, served = self.requests_served, "session ended"),
            Err(e) => error!(error = %e, served = self.requests_served, "session terminated"),
        }
        outcome
    }

    async fn serve<F>(&mut self, shutdown: F) -> Result<SessionEnd, TransportError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.state = SessionState::AwaitingRequest;

        loop {
            let frame = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("stop requested, shutting down");
                    return Ok(SessionEnd::Shutdown);
                }
                frame = self.transport.read_frame() => frame,
            };

            let request = match frame {
                Ok(Frame::Request(request)) => request,
                Ok(Frame::EndOfStream) => {
                    info!("input closed, shutting down");
                    return Ok(SessionEnd::EndOfStream);
                }
                Err(e) => {
                    if matches!(e, TransportError::Decode(_)) {
                        self.report_decode_error(&e).await;
                    }
                    return Err(e);
                }
            };

            self.state = SessionState::Processing;
            if let Some(response) = self.server.handle_request(request) {
                self.transport.write_frame(&response).await?;
            }
            self.requests_served += 1;
            self.state = SessionState::AwaitingRequest;
        }
    }

    /// Best-effort parse error to the client before the session ends
    async fn report_decode_error(&mut self, err: &TransportError) {
        let response = MCPResponse::error(None, MCPError::new(err.error_code(), format!("Parse error: {err}")));
        if let Err(e) = self.transport.write_frame(&response).await {
            debug!(error = %e, "could not report parse error");
        }
    }
}
