//! Client-session state and the inbound event router.
//!
//! [`ChatClient`] owns everything the UI needs to stay consistent: the
//! current character and session ids, the cached character/session lists,
//! the typing-indicator flag and the error banner. Applying an inbound
//! [`ServerEvent`] is a pure state transition that returns the [`Effect`]s
//! to render, which keeps the whole router unit-testable without a socket
//! or a terminal.

use thiserror::Error;

use crate::dto::http::{Character, SessionSummary};
use crate::dto::websocket::{ClientAction, Role, ServerEvent};

/// How long an error banner stays visible (milliseconds).
pub const ERROR_BANNER_TTL_MILLIS: i64 = 5_000;

/// Sender of a rendered transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSender {
    User,
    Bot,
}

/// A renderable consequence of applying an inbound event.
///
/// Effects are ordered; the event loop renders them in sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Drop everything rendered so far and start a fresh transcript
    ClearTranscript,
    /// Print a transcript message
    AppendMessage {
        sender: MessageSender,
        content: String,
    },
    /// Print the typing indicator (emitted at most once until removed)
    ShowTypingIndicator,
    /// The typing indicator is no longer active
    RemoveTypingIndicator,
    /// Print a transient error banner
    ShowErrorBanner { message: String },
    /// Render the summary panel
    ShowSummary { summary: Option<String> },
    /// Re-render the session list so the active entry is marked
    RefreshSessionHighlight,
}

/// Why a `/character` command did not produce a send.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectCharacterError {
    #[error("'{0}' is already the current character")]
    AlreadySelected(String),
    #[error("unknown character id '{0}'; /characters lists the available ones")]
    UnknownCharacter(String),
}

/// Why a `/summary` command did not produce a send.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("no active session; start a conversation first")]
    NoActiveSession,
}

#[derive(Debug)]
struct ErrorBanner {
    message: String,
    shown_at: i64,
}

/// Client-session object for one connection to the chat backend.
#[derive(Debug)]
pub struct ChatClient {
    client_id: String,
    current_character_id: Option<String>,
    current_session_id: Option<i64>,
    characters: Vec<Character>,
    sessions: Vec<SessionSummary>,
    typing_indicator: bool,
    error_banner: Option<ErrorBanner>,
}

impl ChatClient {
    /// Create a fresh client-session with no cached lists and no session.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            current_character_id: None,
            current_session_id: None,
            characters: Vec::new(),
            sessions: Vec::new(),
            typing_indicator: false,
            error_banner: None,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn current_character_id(&self) -> Option<&str> {
        self.current_character_id.as_deref()
    }

    pub fn current_session_id(&self) -> Option<i64> {
        self.current_session_id
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn typing_indicator_shown(&self) -> bool {
        self.typing_indicator
    }

    /// Store the bootstrapped character list. The first entry becomes the
    /// default selection.
    pub fn set_characters(&mut self, characters: Vec<Character>) {
        self.current_character_id = characters.first().map(|c| c.id.clone());
        self.characters = characters;
    }

    /// Store the bootstrapped session list.
    pub fn set_sessions(&mut self, sessions: Vec<SessionSummary>) {
        self.sessions = sessions;
    }

    /// Display name for a character id, falling back to the id itself when
    /// the id is not in the cached list.
    pub fn character_name<'a>(&'a self, character_id: &'a str) -> &'a str {
        self.characters
            .iter()
            .find(|c| c.id == character_id)
            .map(|c| c.name.as_str())
            .unwrap_or(character_id)
    }

    /// Whether a session-list entry should carry the active marker.
    pub fn is_active_session(&self, session_id: i64) -> bool {
        self.current_session_id == Some(session_id)
    }

    // ---- outbound guards ----

    /// Compose a chat send. Returns `None` for empty input; otherwise the
    /// local echo effects and the outbound action.
    pub fn send_chat(&self, message: &str) -> Option<(Vec<Effect>, ClientAction)> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        Some((
            vec![Effect::AppendMessage {
                sender: MessageSender::User,
                content: message.to_string(),
            }],
            ClientAction::Chat {
                message: message.to_string(),
            },
        ))
    }

    /// Compose a character switch. Selecting the current character is a
    /// no-op, and ids outside the cached list are rejected locally.
    pub fn select_character(
        &self,
        character_id: &str,
    ) -> Result<ClientAction, SelectCharacterError> {
        if self.current_character_id.as_deref() == Some(character_id) {
            return Err(SelectCharacterError::AlreadySelected(
                character_id.to_string(),
            ));
        }
        if !self.characters.iter().any(|c| c.id == character_id) {
            return Err(SelectCharacterError::UnknownCharacter(
                character_id.to_string(),
            ));
        }
        Ok(ClientAction::SelectCharacter {
            character_id: character_id.to_string(),
        })
    }

    /// Compose a session load. Unguarded: the backend answers with an error
    /// event for ids it does not know.
    pub fn load_session(&self, session_id: i64) -> ClientAction {
        ClientAction::LoadSession { session_id }
    }

    /// Compose a new-chat request.
    pub fn start_new_chat(&self) -> ClientAction {
        ClientAction::ClearHistory
    }

    /// Compose a summary request. Requires an active session.
    pub fn request_summary(&self) -> Result<ClientAction, SummaryError> {
        if self.current_session_id.is_none() {
            return Err(SummaryError::NoActiveSession);
        }
        Ok(ClientAction::GetSummary)
    }

    // ---- inbound router ----

    /// Apply an inbound event, returning the effects to render in order.
    ///
    /// `now_millis` stamps the error banner so its expiry can be checked
    /// against the same clock later.
    pub fn apply(&mut self, event: ServerEvent, now_millis: i64) -> Vec<Effect> {
        match event {
            ServerEvent::Response {
                message,
                session_id,
            } => {
                let mut effects = self.remove_typing_indicator();
                effects.push(Effect::AppendMessage {
                    sender: MessageSender::Bot,
                    content: message,
                });
                if let Some(id) = session_id {
                    self.current_session_id = Some(id);
                    effects.push(Effect::RefreshSessionHighlight);
                }
                effects
            }
            ServerEvent::Status { status } => {
                if status == "thinking" {
                    self.show_typing_indicator()
                } else {
                    Vec::new()
                }
            }
            ServerEvent::CharacterChanged {
                character_id,
                session_id,
            } => {
                // Name resolution uses the cached list, the equivalent of
                // reading the dropdown's displayed label.
                let welcome = format!(
                    "Hello! I'm {}. Happy to talk with you.",
                    self.character_name(&character_id)
                );
                self.current_character_id = Some(character_id);
                self.current_session_id = session_id;
                vec![
                    Effect::ClearTranscript,
                    Effect::AppendMessage {
                        sender: MessageSender::Bot,
                        content: welcome,
                    },
                ]
            }
            ServerEvent::SessionLoaded {
                history,
                session_id,
            } => {
                self.current_session_id = Some(session_id);
                let mut effects = vec![Effect::ClearTranscript];
                for entry in history {
                    let sender = match entry.role {
                        Role::User => MessageSender::User,
                        Role::Assistant => MessageSender::Bot,
                        Role::Other => continue,
                    };
                    effects.push(Effect::AppendMessage {
                        sender,
                        content: entry.content,
                    });
                }
                effects.push(Effect::RefreshSessionHighlight);
                effects
            }
            ServerEvent::HistoryCleared { session_id } => {
                self.current_session_id = session_id;
                vec![Effect::ClearTranscript]
            }
            ServerEvent::SummaryResult { summary, .. } => {
                vec![Effect::ShowSummary { summary }]
            }
            ServerEvent::Error { error } => {
                let mut effects = self.remove_typing_indicator();
                self.error_banner = Some(ErrorBanner {
                    message: error.clone(),
                    shown_at: now_millis,
                });
                effects.push(Effect::ShowErrorBanner { message: error });
                effects
            }
            ServerEvent::Unknown => Vec::new(),
        }
    }

    fn show_typing_indicator(&mut self) -> Vec<Effect> {
        if self.typing_indicator {
            // Idempotent: the marker is already on screen
            return Vec::new();
        }
        self.typing_indicator = true;
        vec![Effect::ShowTypingIndicator]
    }

    fn remove_typing_indicator(&mut self) -> Vec<Effect> {
        if !self.typing_indicator {
            return Vec::new();
        }
        self.typing_indicator = false;
        vec![Effect::RemoveTypingIndicator]
    }

    // ---- error banner ----

    /// The banner message, if one is still within its display window.
    pub fn active_error_banner(&self, now_millis: i64) -> Option<&str> {
        self.error_banner
            .as_ref()
            .filter(|banner| now_millis - banner.shown_at < ERROR_BANNER_TTL_MILLIS)
            .map(|banner| banner.message.as_str())
    }

    /// Drop the banner once its display window has elapsed. Returns whether
    /// a banner was removed.
    pub fn purge_expired_banner(&mut self, now_millis: i64) -> bool {
        let expired = self
            .error_banner
            .as_ref()
            .is_some_and(|banner| now_millis - banner.shown_at >= ERROR_BANNER_TTL_MILLIS);
        if expired {
            self.error_banner = None;
        }
        expired
    }
}
