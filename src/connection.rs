//! TCP connection with framed send/receive primitives.
//!
//! One [`Connection`] owns one duplex stream for the lifetime of the
//! session; nothing else reads or writes it. The socket is released when
//! the value drops, on every exit path.

use std::collections::VecDeque;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::Config;
use crate::error::ClientError;
use crate::framing::{encode_request, Response, ResponseDecoder};

/// Receive buffer size.
const READ_BUF_LEN: usize = 64 * 1024;

/// A framed connection to the ambry server.
pub struct Connection {
    stream: TcpStream,
    decoder: ResponseDecoder,
    read_buf: Vec<u8>,
    /// Responses decoded beyond the one last returned. A single read can
    /// carry several frames; extras are handed out in arrival order.
    pending: VecDeque<Response>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Open a TCP stream to the configured endpoint.
    ///
    /// No handshake beyond TCP's own is performed; the connection is usable
    /// immediately.
    pub async fn connect(config: &Config) -> Result<Self, ClientError> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .map_err(ClientError::Connect)?;
        log::debug!("[Connection] connected to {}:{}", config.host, config.port);

        Ok(Self {
            stream,
            decoder: ResponseDecoder::new(),
            read_buf: vec![0u8; READ_BUF_LEN],
            pending: VecDeque::new(),
        })
    }

    /// Wrap an already-connected stream.
    ///
    /// Used by tests to drive a session against a mock peer.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            decoder: ResponseDecoder::new(),
            read_buf: vec![0u8; READ_BUF_LEN],
            pending: VecDeque::new(),
        }
    }

    /// Send one request frame, writing the length prefix and payload in full.
    pub async fn send_frame(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        let encoded = encode_request(payload);
        self.stream
            .write_all(&encoded)
            .await
            .map_err(ClientError::Write)?;
        Ok(())
    }

    /// Receive one response frame, accumulating across partial reads.
    ///
    /// Returns [`ClientError::Eof`] when the peer closes with no bytes
    /// pending, and [`ClientError::Read`] when it closes mid-frame — a
    /// short delivery is a protocol violation, never a silent short read.
    ///
    /// Cancel safe: bytes already read stay buffered in the decoder, so a
    /// future dropped by `select!` loses nothing.
    pub async fn recv_response(&mut self) -> Result<Response, ClientError> {
        loop {
            if let Some(response) = self.pending.pop_front() {
                return Ok(response);
            }

            let n = self
                .stream
                .read(&mut self.read_buf)
                .await
                .map_err(ClientError::Read)?;
            if n == 0 {
                if self.decoder.has_partial() {
                    // Peer declared more bytes than it delivered
                    return Err(ClientError::Read(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "stream closed mid-frame",
                    )));
                }
                return Err(ClientError::Eof);
            }
            let decoded = self.decoder.feed(&self.read_buf[..n]);
            self.pending.extend(decoded);
        }
    }
}
