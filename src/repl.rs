//! Interactive event loop: one thread, two readiness sources.
//!
//! Blocks on `tokio::select!` over terminal input and the server connection
//! with no timeout, services whichever source becomes ready, and repeats
//! until the server goes away or input closes. `select!` polls its branches
//! in random order, so nothing here assumes an ordering between "line typed"
//! and "response arrived" when both are ready at once.

use std::io::Write as _;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::Config;
use crate::connection::Connection;
use crate::error::ClientError;
use crate::framing::Response;

/// Sentinel request for the prompt label round-trip.
const WORKING_DB_REQUEST: &[u8] = b"working_db";
/// Label shown when the server reports no open database.
const NO_DB_LABEL: &str = "No db open";

/// One serviced readiness event.
enum Event {
    /// A line from the terminal, or `None` when input closed.
    Line(Option<String>),
    /// A framed response (or failure) from the server.
    Response(Result<Response, ClientError>),
}

/// The interactive loop over one [`Connection`].
///
/// Owns the connection exclusively; no other component touches it, so no
/// locking is involved anywhere.
pub struct Repl<R> {
    conn: Connection,
    prompt_label: bool,
    lines: Lines<R>,
}

impl Repl<BufReader<Stdin>> {
    /// Create a loop reading lines from the process's stdin.
    pub fn new(conn: Connection, config: &Config) -> Self {
        Self::with_input(conn, config, BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Repl<R> {
    /// Create a loop reading lines from an arbitrary source.
    ///
    /// Used by tests to script a session.
    pub fn with_input(conn: Connection, config: &Config, input: R) -> Self {
        Self {
            conn,
            prompt_label: config.prompt_label,
            lines: input.lines(),
        }
    }

    /// Run until the connection is lost or input closes.
    ///
    /// Exactly one unit of work is performed per ready source per
    /// iteration. Write and read failures end the session; an undecodable
    /// body does not (see [`format_response`]). A clean close by the server
    /// is a normal exit wherever it is observed.
    pub async fn run(mut self) -> Result<(), ClientError> {
        // The first prompt is unconditional; afterwards it is reprinted
        // only once a line was sent, so a burst of displayed responses
        // does not trigger label round-trips of its own.
        let mut need_prompt = true;

        loop {
            if need_prompt {
                match self.print_prompt().await {
                    Ok(()) => need_prompt = false,
                    // Clean close during the label round-trip, same normal
                    // exit as one seen while waiting for events
                    Err(ClientError::Eof) => {
                        log::info!("[Repl] server closed the connection");
                        println!("server closed the connection");
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                }
            }

            // `Lines::next_line` and `recv_response` are both cancel safe,
            // so the losing branch leaves no bytes behind.
            let event = tokio::select! {
                line = self.lines.next_line() => {
                    Event::Line(line.map_err(ClientError::Read)?)
                }
                response = self.conn.recv_response() => Event::Response(response),
            };

            match event {
                Event::Line(None) => {
                    log::info!("[Repl] input closed, exiting");
                    return Ok(());
                }
                Event::Line(Some(line)) => {
                    self.conn.send_frame(line.as_bytes()).await?;
                    need_prompt = true;
                }
                Event::Response(Ok(response)) => match format_response(&response) {
                    Ok(text) => println!("{text}"),
                    // Recoverable: one bad frame must not end the session
                    Err(e) => log::warn!("[Repl] dropping response: {e}"),
                },
                Event::Response(Err(ClientError::Eof)) => {
                    log::info!("[Repl] server closed the connection");
                    println!("server closed the connection");
                    return Ok(());
                }
                Event::Response(Err(e)) => return Err(e),
            }
        }
    }

    /// Print the prompt for the next line of input.
    async fn print_prompt(&mut self) -> Result<(), ClientError> {
        if self.prompt_label {
            let label = self.fetch_label().await?;
            print!("{label} => ");
        } else {
            print!("=> ");
        }
        std::io::stdout().flush().map_err(ClientError::Write)?;
        Ok(())
    }

    /// Ask the server for the working database name.
    ///
    /// This is a nested round-trip inside the loop: the receive here is
    /// reentrant into the framed protocol, and a response already in flight
    /// for an earlier command would be consumed as the label. Responses
    /// arrive in order on one TCP stream, so the label is only ever off by
    /// however many commands are outstanding — inherited behavior, enabled
    /// solely by the prompt toggle.
    async fn fetch_label(&mut self) -> Result<String, ClientError> {
        self.conn.send_frame(WORKING_DB_REQUEST).await?;
        let response = self.conn.recv_response().await?;

        if response.status != 0 {
            return Ok(NO_DB_LABEL.to_string());
        }
        match String::from_utf8(response.body) {
            Ok(name) => Ok(name),
            Err(e) => {
                log::warn!("[Repl] undecodable label, using fallback: {e}");
                Ok(NO_DB_LABEL.to_string())
            }
        }
    }
}

/// Render a response for display as `{status}; {body}`.
///
/// Fails with [`ClientError::Decode`] when the body is not valid UTF-8;
/// callers treat that as a per-message warning, not a session fault.
pub fn format_response(response: &Response) -> Result<String, ClientError> {
    let body = std::str::from_utf8(&response.body).map_err(ClientError::Decode)?;
    Ok(format!("{}; {}", response.status, body))
}
