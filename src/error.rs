//! Error taxonomy for the client.
//!
//! Transport-level failures are unrecoverable within a session: there is no
//! retry or reconnect, the loop exits and the process reports the error.
//! [`ClientError::Decode`] is the exception — the event loop reports it and
//! keeps the session alive. Nonzero response status codes are application
//! data, not faults, and never appear here.

use std::fmt;

/// Error raised by connection setup or framed I/O.
#[derive(Debug)]
pub enum ClientError {
    /// Initial connect failed: endpoint unreachable or connection refused.
    Connect(std::io::Error),
    /// A frame write did not complete.
    Write(std::io::Error),
    /// The stream errored, or closed mid-frame with fewer bytes delivered
    /// than the header declared.
    Read(std::io::Error),
    /// The peer closed cleanly with no partial frame pending.
    Eof,
    /// A response body is not valid UTF-8. Recoverable per-message.
    Decode(std::str::Utf8Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Connect(e) => write!(f, "connect failed: {e}"),
            ClientError::Write(e) => write!(f, "write failed: {e}"),
            ClientError::Read(e) => write!(f, "read failed: {e}"),
            ClientError::Eof => write!(f, "connection closed by peer"),
            ClientError::Decode(e) => write!(f, "response body is not valid UTF-8: {e}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Connect(e) | ClientError::Write(e) | ClientError::Read(e) => Some(e),
            ClientError::Eof => None,
            ClientError::Decode(e) => Some(e),
        }
    }
}
