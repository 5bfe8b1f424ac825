//! Client configuration.
//!
//! Host and port were compile-time constants in early versions; they now
//! travel in an explicit [`Config`] handed to
//! [`Connection::connect`](crate::Connection::connect). Populated from CLI
//! flags — no config file, no persistence.

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for one client session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Target hostname or IP.
    pub host: String,
    /// Target TCP port.
    pub port: u16,
    /// Fetch the working database name and show it in the prompt before
    /// each line of input.
    pub prompt_label: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            prompt_label: false,
        }
    }
}

/// The local machine's hostname, falling back to loopback when unavailable.
///
/// The server is conventionally reachable at the machine's own name, which
/// resolves to loopback in a typical single-host deployment.
pub fn default_host() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}
