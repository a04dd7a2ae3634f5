//! WebSocket message DTOs exchanged with the chat backend.
//!
//! Every frame is a JSON object discriminated by its `action` field, so both
//! directions are modeled as internally tagged enums. Routing an inbound
//! frame is then an exhaustive `match`, and adding a variant is caught at
//! compile time.

use serde::{Deserialize, Serialize};

/// Outbound client → server actions.
///
/// All sends are fire-and-forget: no request ids, no acknowledgement
/// tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Send a chat message to the current character
    Chat { message: String },
    /// Switch the active character
    SelectCharacter { character_id: String },
    /// Load a persisted session by id
    LoadSession { session_id: i64 },
    /// Start a fresh conversation
    ClearHistory,
    /// Request a summary of the current session
    GetSummary,
}

/// Inbound server → client events.
///
/// Unrecognized `action` values deserialize to [`ServerEvent::Unknown`],
/// which the router drops without effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A bot reply; carries the session id once the backend has one
    Response {
        message: String,
        #[serde(default)]
        session_id: Option<i64>,
    },
    /// Backend activity notice ("thinking" drives the typing indicator)
    Status { status: String },
    /// Acknowledgement of a character switch
    CharacterChanged {
        character_id: String,
        #[serde(default)]
        session_id: Option<i64>,
    },
    /// A persisted session was loaded; `history` replays its transcript
    SessionLoaded {
        #[serde(default)]
        history: Vec<HistoryEntry>,
        session_id: i64,
    },
    /// The conversation was reset
    HistoryCleared {
        #[serde(default)]
        session_id: Option<i64>,
    },
    /// Result of a summary request; `summary` may be absent
    SummaryResult {
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        session_id: Option<i64>,
    },
    /// Protocol-level error to surface as a transient banner
    Error { error: String },
    #[serde(other)]
    Unknown,
}

/// A single entry of a replayed session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Author of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Roles the transcript does not render (e.g. "system")
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_action_serializes_with_action_tag() {
        // テスト項目: chat アクションが action フィールド付きでシリアライズされる
        // given (前提条件):
        let action = ClientAction::Chat {
            message: "Hello!".to_string(),
        };

        // when (操作):
        let json = serde_json::to_string(&action).unwrap();

        // then (期待する結果):
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["action"], "chat");
        assert_eq!(value["message"], "Hello!");
    }

    #[test]
    fn test_unit_actions_serialize_as_bare_tags() {
        // テスト項目: フィールドを持たないアクションが action タグのみで表現される
        // given (前提条件):
        let clear = ClientAction::ClearHistory;
        let summary = ClientAction::GetSummary;

        // when (操作):
        let clear_json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&clear).unwrap()).unwrap();
        let summary_json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&summary).unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(clear_json, serde_json::json!({"action": "clear_history"}));
        assert_eq!(summary_json, serde_json::json!({"action": "get_summary"}));
    }

    #[test]
    fn test_select_character_wire_shape() {
        // テスト項目: select_character アクションのワイヤ形式が後端の期待と一致する
        // given (前提条件):
        let action = ClientAction::SelectCharacter {
            character_id: "li_ming".to_string(),
        };

        // when (操作):
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&action).unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({"action": "select_character", "character_id": "li_ming"})
        );
    }

    #[test]
    fn test_response_without_session_id_deserializes() {
        // テスト項目: session_id を持たない response イベントがパースできる
        // given (前提条件):
        let json = r#"{"action": "response", "message": "Hi there"}"#;

        // when (操作):
        let event: ServerEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ServerEvent::Response {
                message: "Hi there".to_string(),
                session_id: None,
            }
        );
    }

    #[test]
    fn test_response_with_session_id_deserializes() {
        // テスト項目: session_id 付きの response イベントがパースできる
        // given (前提条件):
        let json = r#"{"action": "response", "message": "Hi", "session_id": 42}"#;

        // when (操作):
        let event: ServerEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ServerEvent::Response {
                message: "Hi".to_string(),
                session_id: Some(42),
            }
        );
    }

    #[test]
    fn test_unknown_action_deserializes_to_unknown() {
        // テスト項目: 未知の action が Unknown バリアントになる
        // given (前提条件):
        let json = r#"{"action": "telemetry", "payload": {"cpu": 3}}"#;

        // when (操作):
        let event: ServerEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(event, ServerEvent::Unknown);
    }

    #[test]
    fn test_session_loaded_history_roles() {
        // テスト項目: session_loaded の履歴エントリの role が正しくパースされる
        // given (前提条件):
        let json = r#"{
            "action": "session_loaded",
            "session_id": 7,
            "history": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "system", "content": "you are a poet"}
            ]
        }"#;

        // when (操作):
        let event: ServerEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        let ServerEvent::SessionLoaded {
            history,
            session_id,
        } = event
        else {
            panic!("expected SessionLoaded");
        };
        assert_eq!(session_id, 7);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2].role, Role::Other);
    }

    #[test]
    fn test_summary_result_with_null_summary() {
        // テスト項目: summary が null の summary_result がパースできる
        // given (前提条件):
        let json = r#"{"action": "summary_result", "summary": null, "session_id": 1}"#;

        // when (操作):
        let event: ServerEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ServerEvent::SummaryResult {
                summary: None,
                session_id: Some(1),
            }
        );
    }
}
