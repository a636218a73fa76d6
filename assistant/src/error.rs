//! Error types for the generative assistant clients

use thiserror::Error;

/// Errors that can occur when calling a generative API
///
/// These never reach booking state: [`crate::GenerativeAssistant`] turns
/// them into fallback values, except for video generation where the caller
/// reports a failure instead of showing a placeholder.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// No API key configured for the requested capability
    #[error("Missing API key for {0}")]
    MissingApiKey(&'static str),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Rate limited - too many requests
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Unauthorized - invalid API key
    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    /// API returned an error
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// The model answered without any text
    #[error("Empty response")]
    EmptyResponse,

    /// Video generation finished without producing a video
    #[error("Video generation failed: {0}")]
    VideoFailed(String),
}

impl AssistantError {
    /// Map a non-success HTTP status and body to an error
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Self::Unauthorized,
            status => Self::ApiError {
                status: status.as_u16(),
                message: body,
            },
        }
    }
}
