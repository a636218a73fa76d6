//! Claude Messages API client

use crate::{
    error::AssistantError,
    messages::{MessagesRequest, MessagesResponse},
};
use reqwest::{Client, StatusCode};

/// Default Messages API base URL
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API client used for listing copy and chat
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// Create a new client with API key from environment
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::MissingApiKey` if `ANTHROPIC_API_KEY` is not set
    pub fn from_env() -> Result<Self, AssistantError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AssistantError::MissingApiKey("ANTHROPIC_API_KEY"))?;

        Ok(Self::new(api_key))
    }

    /// Create a new client with explicit API key
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Point the client at another base URL (proxies, tests)
    #[must_use]
    pub fn with_base_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create messages (non-streaming)
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, API errors, or parsing failures
    pub async fn messages(&self, request: MessagesRequest) -> Result<MessagesResponse, AssistantError> {
        tracing::debug!(model = %request.model, turns = request.messages.len(), "Sending messages request");

        let response = self
            .client
            .post(format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<MessagesResponse>()
                .await
                .map_err(|e| AssistantError::ResponseParseFailed(e.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AssistantError::from_status(status, body))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AnthropicClient::new("test-key".to_string());
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = AnthropicClient::new("k".to_string()).with_base_url("http://localhost:9000/v1/");
        assert_eq!(client.api_url, "http://localhost:9000/v1");
    }

    #[test]
    fn debug_hides_api_key() {
        let client = AnthropicClient::new("secret".to_string());
        assert!(!format!("{client:?}").contains("secret"));
    }
}
