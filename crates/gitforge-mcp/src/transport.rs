//! Transport layer for MCP JSON-RPC communication.
//!
//! MCP uses newline-delimited JSON. This transport owns the framing
//! only: blank-line skipping, the message size cap, and flushed
//! line-at-a-time writes. Parsing lives in the server.

use std::io::{self, BufRead, Write};

use crate::protocol::JsonRpcResponse;

/// Maximum size of a single incoming message. A line exceeding this is
/// a transport fault: the read fails instead of truncating.
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Line-framed transport over a pair of byte streams.
pub struct Transport {
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
}

impl Transport {
    /// Create a transport using stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// Create a transport over custom streams.
    pub fn new(reader: Box<dyn BufRead + Send>, writer: Box<dyn Write + Send>) -> Self {
        Self { reader, writer }
    }

    /// Read the next non-blank line, or `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if line.len() > MAX_MESSAGE_SIZE {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("message exceeds maximum size of {} bytes", MAX_MESSAGE_SIZE),
                ));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(trimmed.to_string()));
        }
    }

    /// Write one response line, newline-terminated, and flush it before
    /// the next message is read.
    pub fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )
        })?;

        tracing::debug!("Sending: {}", json);

        writeln!(self.writer, "{}", json)?;
        self.writer.flush()
    }
}
