//! Read-only HTTP client for the bootstrap endpoints.

use crate::dto::http::{Character, CharactersResponse, SessionSummary, SessionsResponse};

/// Thin client over the backend's read-only REST endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the character list.
    ///
    /// Errors are logged and swallowed: callers get an empty list and the
    /// UI degrades, matching the bootstrap failure policy.
    pub async fn load_characters(&self) -> Vec<Character> {
        match self.fetch_characters().await {
            Ok(response) => response.characters,
            Err(e) => {
                tracing::error!("Failed to load characters: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch the session list. Same failure policy as [`Self::load_characters`].
    pub async fn load_sessions(&self) -> Vec<SessionSummary> {
        match self.fetch_sessions().await {
            Ok(response) => response.sessions,
            Err(e) => {
                tracing::error!("Failed to load sessions: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_characters(&self) -> Result<CharactersResponse, reqwest::Error> {
        self.http
            .get(format!("{}/api/characters", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn fetch_sessions(&self) -> Result<SessionsResponse, reqwest::Error> {
        self.http
            .get(format!("{}/api/sessions", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
