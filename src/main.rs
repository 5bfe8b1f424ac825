//! ambry-client - interactive shell for the ambry database server.
//!
//! Connects to the server, then runs a single-threaded loop that forwards
//! typed lines as framed requests and prints framed responses as they
//! arrive. See the `ambry_client` library for the protocol machinery.

use ambry_client::config::{default_host, DEFAULT_PORT};
use ambry_client::{Config, Connection, Repl};
use anyhow::{Context, Result};
use clap::Parser;

/// CLI
#[derive(Parser)]
#[command(name = "ambry-client")]
#[command(version)]
#[command(about = "Interactive shell for the ambry database server")]
struct Cli {
    /// Server hostname or IP. Defaults to this machine's hostname.
    #[arg(long)]
    host: Option<String>,

    /// Server TCP port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Fetch the working database name and show it in the prompt.
    #[arg(long)]
    prompt: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they interleave cleanly with the prompt on stdout
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config {
        host: cli.host.unwrap_or_else(default_host),
        port: cli.port,
        prompt_label: cli.prompt,
    };

    let conn = Connection::connect(&config).await.with_context(|| {
        format!("could not connect to {} on port {}", config.host, config.port)
    })?;
    println!("connected to {} on port {}", config.host, config.port);

    Repl::new(conn, &config).run().await.context("session failed")?;
    Ok(())
}
