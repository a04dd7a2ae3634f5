//! HTTP API response DTOs for the bootstrap endpoints.

use serde::{Deserialize, Serialize};

/// A selectable conversational persona exposed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    /// Short blurb the backend attaches; unused beyond display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response body of `GET /api/characters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharactersResponse {
    #[serde(default)]
    pub characters: Vec<Character>,
}

/// A persisted conversation thread as listed by `GET /api/sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub character_id: String,
    /// ISO 8601 timestamp of the last update
    pub updated_at: String,
    pub message_count: i64,
}

/// Response body of `GET /api/sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}
