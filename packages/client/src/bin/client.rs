//! Kaiwa terminal chat client.
//!
//! Fetches the character and session lists from the backend's REST API,
//! then talks to it over a WebSocket at `/ws/{client_id}`. Reconnects after
//! a fixed 3 second delay whenever the connection drops.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaiwa-client
//! cargo run --bin kaiwa-client -- --server-url http://127.0.0.1:8000
//! ```

use clap::Parser;

use kaiwa_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kaiwa-client")]
#[command(about = "Terminal chat client for an AI character chat backend", long_about = None)]
struct Args {
    /// Backend base URL (HTTP; the WebSocket URL is derived from it)
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8000")]
    server_url: String,

    /// Client ID; a random UUID is generated when omitted
    #[arg(short = 'c', long)]
    client_id: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // The identity is generated once and stays stable for the process
    let client_id = args
        .client_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if let Err(e) = kaiwa_client::runner::run_client(args.server_url, client_id).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
