//! Line-delimited JSON transport
//!
//! Each JSON-RPC message is a single line terminated by `\n`, as in the MCP
//! stdio transport. Blank lines are skipped. A line that is not valid UTF-8
//! or not a JSON-RPC message is a decode error, which ends the session.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::trace;

use crate::error::TransportError;
use crate::server::{MCPRequest, MCPResponse};

/// One read from the transport
#[derive(Debug, Clone)]
pub enum Frame {
    Request(MCPRequest),
    /// The peer closed the stream
    EndOfStream,
}

/// Frame-level transport used by the session loop
#[async_trait]
pub trait Transport: Send {
    /// Read and decode the next frame
    async fn read_frame(&mut self) -> Result<Frame, TransportError>;

    /// Encode, write and flush one response frame
    async fn write_frame(&mut self, response: &MCPResponse) -> Result<(), TransportError>;

    /// Flush and shut down the output side
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Reads requests from an input stream, writes responses to an output stream
///
/// Generic over reader/writer for testability; the binary uses stdin/stdout.
pub struct StdioTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write_line(&mut self, message: &str) -> Result<(), TransportError> {
        trace!(len = message.len(), "writing frame");

        self.writer
            .write_all(message.as_bytes())
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self.reader.read_line(&mut line).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::InvalidData {
                    TransportError::Decode(format!("frame is not valid UTF-8: {e}"))
                } else {
                    TransportError::Read(e.to_string())
                }
            })?;

            if bytes_read == 0 {
                return Ok(Frame::EndOfStream);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            trace!(len = trimmed.len(), "read frame");
            return serde_json::from_str::<MCPRequest>(trimmed)
                .map(Frame::Request)
                .map_err(|e| TransportError::Decode(e.to_string()));
        }
    }

    async fn write_frame(&mut self, response: &MCPResponse) -> Result<(), TransportError> {
        let json = serde_json::to_string(response).map_err(|e| TransportError::Write(e.to_string()))?;
        self.write_line(&json).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.writer
            .flush()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        self.writer
            .shutdown()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn transport(input: &[u8]) -> StdioTransport<Cursor<Vec<u8>>, Vec<u8>> {
        StdioTransport::new(Cursor::new(input.to_vec()), Vec::new())
    }

    #[tokio::test]
    async fn test_read_single_request() {
        let mut transport = transport(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");

        match transport.read_frame().await.unwrap() {
            Frame::Request(request) => assert_eq!(request.method, "ping"),
            other => panic!("expected request, got {other:?}"),
        }
        assert!(matches!(transport.read_frame().await.unwrap(), Frame::EndOfStream));
    }

    #[tokio::test]
    async fn test_blank_lines_skipped() {
        let mut transport = transport(b"\n   \n{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}");

        match transport.read_frame().await.unwrap() {
            Frame::Request(request) => assert!(request.is_notification()),
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_input_is_end_of_stream() {
        let mut transport = transport(b"");
        assert!(matches!(transport.read_frame().await.unwrap(), Frame::EndOfStream));
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let mut transport = transport(b"{not json\n");
        let err = transport.read_frame().await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decode_error() {
        let mut transport = transport(b"\xff\xfe\n");
        let err = transport.read_frame().await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_write_appends_newline() {
        let mut transport = transport(b"");
        let response = MCPResponse::success(serde_json::json!(1), serde_json::json!({}));

        transport.write_frame(&response).await.unwrap();

        let output = String::from_utf8(transport.into_writer()).unwrap();
        assert_eq!(output, "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n");
    }

    #[tokio::test]
    async fn test_frame_split_across_reads() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",")
            .read(b"\"id\":5,\"method\":\"tools/list\"}\n")
            .build();
        let mut transport = StdioTransport::new(reader, Vec::new());

        match transport.read_frame().await.unwrap() {
            Frame::Request(request) => {
                assert_eq!(request.method, "tools/list");
                assert_eq!(request.id, Some(serde_json::json!(5)));
            }
            other => panic!("expected request, got {other:?}"),
        }
        assert!(matches!(transport.read_frame().await.unwrap(), Frame::EndOfStream));
    }
}
