//! Interactive client for the ambry database server.
//!
//! Speaks the server's framed wire protocol over TCP: requests are
//! `[u32 LE length][payload]`, responses are `[u8 status][u32 LE length][body]`.
//! The protocol is self-delimiting, so message boundaries never have to be
//! guessed from content.
//!
//! # Architecture
//!
//! ```text
//! terminal ──lines──► Repl ◄──frames──► Connection ◄──TCP──► ambry server
//! ```
//!
//! - [`framing`] - wire codec and incremental response decoder
//! - [`connection`] - one owned TCP stream with framed send/receive
//! - [`repl`] - single-threaded event loop over stdin + socket
//! - [`config`] - endpoint and prompt options
//! - [`error`] - the client error taxonomy

pub mod config;
pub mod connection;
pub mod error;
pub mod framing;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use connection::Connection;
pub use error::ClientError;
pub use framing::{encode_request, Response, ResponseDecoder};
pub use repl::Repl;
