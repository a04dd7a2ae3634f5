//! Message formatting utilities for client display.
//!
//! Markdown content is printed verbatim; rendering fidelity is the
//! backend author's concern, not the terminal's.

use kaiwa_shared::time::{format_iso_timestamp, timestamp_to_local_hms};

use crate::dto::http::{Character, SessionSummary};
use crate::state::MessageSender;

/// Placeholder shown when the backend has no summary for the session.
pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary available yet.";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a transcript message with a local-time stamp.
    pub fn format_message(sender: MessageSender, content: &str, timestamp_millis: i64) -> String {
        let label = match sender {
            MessageSender::User => "you",
            MessageSender::Bot => "bot",
        };
        format!(
            "\n[{} {}]\n{}\n",
            label,
            timestamp_to_local_hms(timestamp_millis),
            content
        )
    }

    /// Format the typing indicator marker.
    pub fn format_typing_indicator() -> String {
        "\n[bot is typing...]\n".to_string()
    }

    /// Format the divider printed when the transcript is cleared.
    pub fn format_transcript_divider() -> String {
        "\n============================================================\n".to_string()
    }

    /// Format a transient error banner.
    pub fn format_error_banner(message: &str) -> String {
        format!("\n!! Error: {}\n", message)
    }

    /// Format the summary panel, falling back to a placeholder when the
    /// backend has nothing to show.
    pub fn format_summary(summary: Option<&str>) -> String {
        let body = summary.unwrap_or(NO_SUMMARY_PLACEHOLDER);
        format!(
            "\n---------------- Conversation summary ----------------\n\
             {}\n\
             -------------------------------------------------------\n",
            body
        )
    }

    /// Format the character list, marking the current selection.
    pub fn format_character_list(characters: &[Character], current: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str("\nCharacters:\n");

        if characters.is_empty() {
            output.push_str("(No characters)\n");
        } else {
            for character in characters {
                let marker = if current == Some(character.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                output.push_str(&format!(
                    "{} {} - {}\n",
                    marker, character.id, character.name
                ));
            }
        }

        output
    }

    /// Format the session list, marking the active session. The full list
    /// is re-rendered on every call; entries are not diffed.
    pub fn format_session_list(sessions: &[SessionSummary], current: Option<i64>) -> String {
        let mut output = String::new();
        output.push_str("\nSessions:\n");

        if sessions.is_empty() {
            output.push_str("(No sessions)\n");
        } else {
            for session in sessions {
                let marker = if current == Some(session.id) { "*" } else { " " };
                output.push_str(&format!(
                    "{} [{}] {} - {} - {} messages\n",
                    marker,
                    session.id,
                    session.character_id,
                    format_iso_timestamp(&session.updated_at),
                    session.message_count
                ));
            }
        }

        output
    }

    /// Format the /help text.
    pub fn format_help() -> String {
        "\nCommands:\n\
         <text>            send a chat message\n\
         /characters       list available characters\n\
         /character <id>   switch to a character\n\
         /sessions         list saved sessions\n\
         /session <id>     load a saved session\n\
         /new              start a new conversation\n\
         /summary          show a summary of the current session\n\
         /help             show this help\n\
         /quit             exit\n"
            .to_string()
    }
}
