//! WebSocket client session: one connection, one event loop.
//!
//! The loop mirrors the single-threaded, run-to-completion event model of
//! the chat surface: one `tokio::select!` over the socket's read half, the
//! user's input channel and the error-banner expiry timer. State lives in
//! the [`ChatClient`] owned by the caller, so nothing is shared and nothing
//! needs locking.

use std::pin::Pin;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use kaiwa_shared::time::get_epoch_millis;

use crate::{
    command::{Command, parse_command},
    dto::websocket::{ClientAction, ServerEvent},
    error::ClientError,
    formatter::MessageFormatter,
    state::{ChatClient, ERROR_BANNER_TTL_MILLIS, Effect, SelectCharacterError},
    ui::redisplay_prompt,
};

/// Whether the input handler wants the session to keep running.
#[derive(Debug, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Quit,
}

/// Run one WebSocket session against `{ws_base_url}/ws/{client_id}`.
///
/// Returns `Ok(())` when the user ends the session (input closed or
/// `/quit`), which stops the reconnect loop. Any transport failure —
/// including a failed send on a socket that died underneath us — comes
/// back as [`ClientError::ConnectionError`] and enters the reconnect path.
pub async fn run_client_session(
    ws_base_url: &str,
    client: &mut ChatClient,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let url = format!(
        "{}/ws/{}",
        ws_base_url.trim_end_matches('/'),
        client.client_id()
    );

    let (ws_stream, _response) = connect_async(&url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server at {}", url);

    let (mut write, mut read) = ws_stream.split();

    // Armed whenever an error banner is shown; fires once, 5 seconds later.
    let mut banner_expiry: Option<Pin<Box<tokio::time::Sleep>>> = None;

    loop {
        tokio::select! {
            message = read.next() => {
                let Some(message) = message else {
                    return Err(ClientError::ConnectionError(
                        "server closed the connection".to_string(),
                    ));
                };
                match message {
                    Ok(Message::Text(text)) => {
                        handle_server_frame(client, &text, &mut banner_expiry);
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        return Err(ClientError::ConnectionError(
                            "server closed the connection".to_string(),
                        ));
                    }
                    Ok(_) => {
                        // Ping/pong is handled by the protocol; the backend
                        // never sends binary frames
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        return Err(ClientError::ConnectionError(e.to_string()));
                    }
                }
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    tracing::info!("Input closed; ending session");
                    return Ok(());
                };
                if handle_input_line(client, &line, &mut write).await? == LoopControl::Quit {
                    return Ok(());
                }
            }
            _ = wait_for_banner_expiry(&mut banner_expiry) => {
                banner_expiry = None;
                if client.purge_expired_banner(get_epoch_millis()) {
                    tracing::debug!("Error banner dismissed");
                }
            }
        }
    }
}

/// Route one inbound text frame through the state object and render the
/// resulting effects.
fn handle_server_frame(
    client: &mut ChatClient,
    text: &str,
    banner_expiry: &mut Option<Pin<Box<tokio::time::Sleep>>>,
) {
    let event = match serde_json::from_str::<ServerEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!("Dropping unparseable frame: {}", e);
            return;
        }
    };

    let now = get_epoch_millis();
    let effects = client.apply(event, now);
    if effects.is_empty() {
        return;
    }

    for effect in &effects {
        if matches!(effect, Effect::ShowErrorBanner { .. }) {
            *banner_expiry = Some(Box::pin(tokio::time::sleep(Duration::from_millis(
                ERROR_BANNER_TTL_MILLIS as u64,
            ))));
        }
        if let Some(rendered) = render_effect(client, effect, now) {
            print!("{}", rendered);
        }
    }
    redisplay_prompt();
}

/// Parse and execute one line of user input.
async fn handle_input_line<S>(
    client: &mut ChatClient,
    line: &str,
    write: &mut S,
) -> Result<LoopControl, ClientError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    match parse_command(line) {
        Ok(Command::Chat(message)) => {
            if let Some((effects, action)) = client.send_chat(&message) {
                let now = get_epoch_millis();
                for effect in &effects {
                    if let Some(rendered) = render_effect(client, effect, now) {
                        print!("{}", rendered);
                    }
                }
                send_action(write, &action).await?;
            }
        }
        Ok(Command::SelectCharacter(character_id)) => match client.select_character(&character_id)
        {
            Ok(action) => send_action(write, &action).await?,
            Err(SelectCharacterError::AlreadySelected(_)) => {
                // Same as re-picking the selected dropdown entry: nothing to do
            }
            Err(err @ SelectCharacterError::UnknownCharacter(_)) => {
                println!("{}", err);
            }
        },
        Ok(Command::LoadSession(session_id)) => {
            send_action(write, &client.load_session(session_id)).await?;
        }
        Ok(Command::NewChat) => {
            send_action(write, &client.start_new_chat()).await?;
        }
        Ok(Command::Summary) => match client.request_summary() {
            Ok(action) => {
                println!("Loading summary...");
                send_action(write, &action).await?;
            }
            Err(err) => {
                println!("{}", err);
            }
        },
        Ok(Command::ListCharacters) => {
            print!(
                "{}",
                MessageFormatter::format_character_list(
                    client.characters(),
                    client.current_character_id(),
                )
            );
        }
        Ok(Command::ListSessions) => {
            print!(
                "{}",
                MessageFormatter::format_session_list(
                    client.sessions(),
                    client.current_session_id(),
                )
            );
        }
        Ok(Command::Help) => {
            print!("{}", MessageFormatter::format_help());
        }
        Ok(Command::Quit) => return Ok(LoopControl::Quit),
        Err(err) => {
            println!("{}", err);
        }
    }

    Ok(LoopControl::Continue)
}

/// Serialize and send one outbound action.
async fn send_action<S>(write: &mut S, action: &ClientAction) -> Result<(), ClientError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = serde_json::to_string(action)?;
    write.send(Message::Text(json.into())).await.map_err(|e| {
        tracing::warn!("Failed to send message: {}", e);
        ClientError::ConnectionError(e.to_string())
    })
}

/// Turn one effect into terminal output.
///
/// Removing the typing indicator renders nothing: the printed marker
/// scrolls away on its own once the reply arrives.
fn render_effect(client: &ChatClient, effect: &Effect, now_millis: i64) -> Option<String> {
    match effect {
        Effect::ClearTranscript => Some(MessageFormatter::format_transcript_divider()),
        Effect::AppendMessage { sender, content } => Some(MessageFormatter::format_message(
            *sender,
            content,
            now_millis,
        )),
        Effect::ShowTypingIndicator => Some(MessageFormatter::format_typing_indicator()),
        Effect::RemoveTypingIndicator => None,
        Effect::ShowErrorBanner { message } => {
            Some(MessageFormatter::format_error_banner(message))
        }
        Effect::ShowSummary { summary } => {
            Some(MessageFormatter::format_summary(summary.as_deref()))
        }
        Effect::RefreshSessionHighlight => Some(MessageFormatter::format_session_list(
            client.sessions(),
            client.current_session_id(),
        )),
    }
}

async fn wait_for_banner_expiry(timer: &mut Option<Pin<Box<tokio::time::Sleep>>>) {
    match timer.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::http::Character;
    use std::task::{Context, Poll};

    /// Sink that records sent frames for assertions.
    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<Message>,
    }

    impl RecordingSink {
        fn sent_action(&self, index: usize) -> Option<serde_json::Value> {
            match self.frames.get(index) {
                Some(Message::Text(text)) => serde_json::from_str(text).ok(),
                _ => None,
            }
        }
    }

    impl Sink<Message> for RecordingSink {
        type Error = std::convert::Infallible;

        fn poll_ready(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(
            self: std::pin::Pin<&mut Self>,
            item: Message,
        ) -> Result<(), Self::Error> {
            self.get_mut().frames.push(item);
            Ok(())
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    fn client_with_characters() -> ChatClient {
        let mut client = ChatClient::new("test-client");
        client.set_characters(vec![
            Character {
                id: "li_ming".to_string(),
                name: "Li Ming".to_string(),
                description: None,
            },
            Character {
                id: "su_shi".to_string(),
                name: "Su Shi".to_string(),
                description: None,
            },
        ]);
        client
    }

    #[tokio::test]
    async fn test_chat_line_sends_chat_action() {
        // テスト項目: 通常の入力行が chat アクションとして送信される
        // given (前提条件):
        let mut client = client_with_characters();
        let mut sink = RecordingSink::default();

        // when (操作):
        let control = handle_input_line(&mut client, "hello bot", &mut sink)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(control, LoopControl::Continue);
        let sent = sink.sent_action(0).unwrap();
        assert_eq!(sent["action"], "chat");
        assert_eq!(sent["message"], "hello bot");
    }

    #[tokio::test]
    async fn test_summary_without_session_sends_nothing() {
        // テスト項目: セッションが無い /summary はソケットに何も送らない
        // given (前提条件):
        let mut client = client_with_characters();
        let mut sink = RecordingSink::default();

        // when (操作):
        let control = handle_input_line(&mut client, "/summary", &mut sink)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(control, LoopControl::Continue);
        assert!(sink.frames.is_empty(), "expected no outbound frame");
    }

    #[tokio::test]
    async fn test_selecting_current_character_sends_nothing() {
        // テスト項目: 現在のキャラクターの再選択はソケットに何も送らない
        // given (前提条件):
        let mut client = client_with_characters();
        let mut sink = RecordingSink::default();

        // when (操作):
        handle_input_line(&mut client, "/character li_ming", &mut sink)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(sink.frames.is_empty(), "expected no outbound frame");
    }

    #[tokio::test]
    async fn test_selecting_other_character_sends_select_action() {
        // テスト項目: 別キャラクターの選択が select_character として送信される
        // given (前提条件):
        let mut client = client_with_characters();
        let mut sink = RecordingSink::default();

        // when (操作):
        handle_input_line(&mut client, "/character su_shi", &mut sink)
            .await
            .unwrap();

        // then (期待する結果):
        let sent = sink.sent_action(0).unwrap();
        assert_eq!(sent["action"], "select_character");
        assert_eq!(sent["character_id"], "su_shi");
    }

    #[tokio::test]
    async fn test_new_and_session_commands_send_actions() {
        // テスト項目: /new と /session が対応するアクションを送信する
        // given (前提条件):
        let mut client = client_with_characters();
        let mut sink = RecordingSink::default();

        // when (操作):
        handle_input_line(&mut client, "/new", &mut sink)
            .await
            .unwrap();
        handle_input_line(&mut client, "/session 7", &mut sink)
            .await
            .unwrap();

        // then (期待する結果):
        let first = sink.sent_action(0).unwrap();
        assert_eq!(first["action"], "clear_history");
        let second = sink.sent_action(1).unwrap();
        assert_eq!(second["action"], "load_session");
        assert_eq!(second["session_id"], 7);
    }

    #[tokio::test]
    async fn test_quit_command_stops_the_loop() {
        // テスト項目: /quit がループ終了を要求する
        // given (前提条件):
        let mut client = client_with_characters();
        let mut sink = RecordingSink::default();

        // when (操作):
        let control = handle_input_line(&mut client, "/quit", &mut sink)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(control, LoopControl::Quit);
        assert!(sink.frames.is_empty(), "expected no outbound frame");
    }

    #[tokio::test]
    async fn test_unknown_command_sends_nothing() {
        // テスト項目: 未知のコマンドはソケットに何も送らない
        // given (前提条件):
        let mut client = client_with_characters();
        let mut sink = RecordingSink::default();

        // when (操作):
        handle_input_line(&mut client, "/teleport home", &mut sink)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(sink.frames.is_empty(), "expected no outbound frame");
    }

    #[test]
    fn test_unparseable_frame_leaves_state_unchanged() {
        // テスト項目: パースできないフレームは状態を変えない
        // given (前提条件):
        let mut client = client_with_characters();
        let mut banner_expiry = None;

        // when (操作):
        handle_server_frame(&mut client, "not json at all", &mut banner_expiry);
        handle_server_frame(&mut client, r#"{"action": "mystery"}"#, &mut banner_expiry);

        // then (期待する結果):
        assert_eq!(client.current_session_id(), None);
        assert!(!client.typing_indicator_shown());
        assert!(banner_expiry.is_none());
    }

    #[tokio::test]
    async fn test_error_frame_arms_banner_expiry() {
        // テスト項目: error フレームがバナー失効タイマーを作動させる
        // given (前提条件):
        let mut client = client_with_characters();
        let mut banner_expiry = None;

        // when (操作):
        handle_server_frame(
            &mut client,
            r#"{"action": "error", "error": "boom"}"#,
            &mut banner_expiry,
        );

        // then (期待する結果):
        assert!(banner_expiry.is_some());
        assert!(client.active_error_banner(get_epoch_millis()).is_some());
    }
}
