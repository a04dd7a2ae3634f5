//! Client execution logic: bootstrap, session loop, reconnection.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::{
    api::ApiClient, error::ClientError, formatter::MessageFormatter, session::run_client_session,
    state::ChatClient, ui::spawn_readline_thread,
};

/// Fixed delay before a reconnect attempt. No backoff growth, no attempt cap.
const RECONNECT_INTERVAL_MILLIS: u64 = 3_000;

/// Derive the WebSocket base URL from the backend's HTTP URL by scheme
/// substitution (`http` → `ws`, `https` → `wss`).
pub fn derive_ws_url(server_url: &str) -> String {
    let trimmed = server_url.trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        trimmed.to_string()
    }
}

/// Run the chat client.
///
/// Bootstraps the character and session lists (two sequential fetches,
/// failures degrade to empty lists), spawns the readline thread, then keeps
/// one WebSocket session alive, reconnecting after a fixed delay until the
/// user exits. The reconnect loop is tied to this function's lifetime:
/// when the session ends normally nothing is left scheduled.
pub async fn run_client(server_url: String, client_id: String) -> Result<(), ClientError> {
    let api = ApiClient::new(server_url.clone());
    let mut client = ChatClient::new(client_id);

    client.set_characters(api.load_characters().await);
    client.set_sessions(api.load_sessions().await);

    print!(
        "{}",
        MessageFormatter::format_character_list(client.characters(), client.current_character_id())
    );
    print!(
        "{}",
        MessageFormatter::format_session_list(client.sessions(), client.current_session_id())
    );
    println!("\nType a message and press Enter to chat. /help lists commands. Ctrl+C exits.");

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let _readline_handle = spawn_readline_thread(input_tx);

    let ws_url = derive_ws_url(&server_url);

    loop {
        match run_client_session(&ws_url, &mut client, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended");
                break;
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                tracing::info!("Reconnecting in {} ms...", RECONNECT_INTERVAL_MILLIS);
                tokio::time::sleep(Duration::from_millis(RECONNECT_INTERVAL_MILLIS)).await;
            }
        }
    }

    Ok(())
}
