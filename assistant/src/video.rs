//! Promotional video generation
//!
//! Generation is a long-running operation: the request is submitted once,
//! then the returned operation is polled until it reports `done`.

use crate::error::AssistantError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default video model
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Default video API base URL
pub const DEFAULT_VIDEO_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prompt used when the caller does not supply one
pub const DEFAULT_VIDEO_PROMPT: &str =
    "Cinematic video of this car driving on a scenic road, high quality, photorealistic";

/// Input for a video generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRequest {
    /// Raw image bytes of the car photo
    pub image: Vec<u8>,
    /// MIME type of the image (e.g. `image/jpeg`)
    pub mime_type: String,
    /// Prompt; `None` or blank uses [`DEFAULT_VIDEO_PROMPT`]
    pub prompt: Option<String>,
}

impl VideoRequest {
    /// The prompt that will be sent
    #[must_use]
    pub fn effective_prompt(&self) -> &str {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_VIDEO_PROMPT)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    instances: [Instance<'a>; 1],
    parameters: Parameters,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Instance<'a> {
    prompt: &'a str,
    image: InlineImage<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage<'a> {
    bytes_base64_encoded: String,
    mime_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    number_of_videos: u8,
    resolution: &'static str,
    aspect_ratio: &'static str,
}

/// Long-running operation as reported by the API
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
    #[serde(default)]
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Deserialize)]
struct GeneratedVideo {
    video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    uri: Option<String>,
}

impl Operation {
    fn video_uri(self) -> Result<String, AssistantError> {
        if let Some(error) = self.error {
            return Err(AssistantError::VideoFailed(error.message));
        }
        self.response
            .and_then(|r| r.generated_videos.into_iter().next())
            .and_then(|v| v.video)
            .and_then(|f| f.uri)
            .ok_or_else(|| AssistantError::VideoFailed("Failed to generate video".to_string()))
    }
}

/// Client for the video generation API
#[derive(Clone)]
pub struct VideoClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    poll_interval: Duration,
}

impl std::fmt::Debug for VideoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl VideoClient {
    /// Create a client with the default model, URL and a 5 second poll interval
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url: DEFAULT_VIDEO_API_URL.to_string(),
            model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval: Duration::from_secs(5),
        }
    }

    /// Builder: Set base URL
    #[must_use]
    pub fn with_base_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: Set model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: Set poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Generate a video and return its URI
    ///
    /// Polls until the operation completes. Dropping the future stops polling.
    ///
    /// # Errors
    ///
    /// Returns an error when submission or polling fails, the operation reports
    /// an error, or it completes without a video.
    pub async fn generate(&self, request: &VideoRequest) -> Result<String, AssistantError> {
        let body = GenerateBody {
            instances: [Instance {
                prompt: request.effective_prompt(),
                image: InlineImage {
                    bytes_base64_encoded: STANDARD.encode(&request.image),
                    mime_type: &request.mime_type,
                },
            }],
            parameters: Parameters {
                number_of_videos: 1,
                resolution: "720p",
                aspect_ratio: "16:9",
            },
        };

        let url = format!("{}/models/{}:predictLongRunning", self.api_url, self.model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::RequestFailed(e.to_string()))?;
        let mut operation = Self::parse_operation(response).await?;
        tracing::info!(operation = %operation.name, model = %self.model, "Video generation started");

        while !operation.done {
            tokio::time::sleep(self.poll_interval).await;
            operation = self.poll(&operation.name).await?;
            tracing::debug!(operation = %operation.name, done = operation.done, "Polled video operation");
        }

        operation.video_uri()
    }

    async fn poll(&self, name: &str) -> Result<Operation, AssistantError> {
        let response = self
            .client
            .get(format!("{}/{name}", self.api_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AssistantError::RequestFailed(e.to_string()))?;
        Self::parse_operation(response).await
    }

    async fn parse_operation(response: reqwest::Response) -> Result<Operation, AssistantError> {
        match response.status() {
            StatusCode::OK => response
                .json::<Operation>()
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
    fn blank_prompt_uses_default() {
        let mut request = VideoRequest {
            image: vec![1, 2, 3],
            mime_type: "image/png".to_string(),
            prompt: Some("   ".to_string()),
        };
        assert_eq!(request.effective_prompt(), DEFAULT_VIDEO_PROMPT);

        request.prompt = Some("Sunset drive".to_string());
        assert_eq!(request.effective_prompt(), "Sunset drive");
    }

    #[test]
    fn finished_operation_without_video_fails() {
        let operation: Operation = serde_json::from_value(serde_json::json!({
            "name": "operations/1",
            "done": true,
            "response": { "generatedVideos": [] }
        }))
        .unwrap();
        assert!(matches!(operation.video_uri(), Err(AssistantError::VideoFailed(_))));
    }

    #[test]
    fn operation_error_is_reported() {
        let operation: Operation = serde_json::from_value(serde_json::json!({
            "name": "operations/1",
            "done": true,
            "error": { "message": "quota exceeded" }
        }))
        .unwrap();
        match operation.video_uri() {
            Err(AssistantError::VideoFailed(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
