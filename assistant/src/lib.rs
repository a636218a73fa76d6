//! # DriveEasy Assistant
//!
//! Generative helpers for the marketplace: listing descriptions, the DriveBot
//! support chat, promo video scripts and promo video generation.
//!
//! Text features never fail from the caller's point of view. Every error is
//! logged and replaced with fallback copy. Video generation returns a
//! `Result` because there is no sensible placeholder for a missing video.
//!
//! ## Example
//!
//! ```no_run
//! use driveeasy_assistant::{Assistant, GenerativeAssistant, AnthropicClient};
//!
//! # async fn demo() {
//! let assistant = GenerativeAssistant::new(AnthropicClient::from_env().ok(), None);
//! let copy = assistant.describe_car("Tesla Model 3", 2023, "Sedan").await;
//! println!("{copy}");
//! # }
//! ```

pub mod client;
pub mod error;
pub mod messages;
pub mod prompts;
pub mod video;

pub use client::AnthropicClient;
pub use error::AssistantError;
pub use messages::{ContentBlock, Message, MessagesRequest, MessagesResponse, Role};
pub use video::{VideoClient, VideoRequest};

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

/// First message shown in a fresh chat
pub const CHAT_GREETING: &str = "Hi! I am DriveBot. How can I help you find your perfect car today?";

/// Who said a chat line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The customer
    User,
    /// DriveBot
    Model,
}

/// One line of the support chat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Speaker
    pub role: ChatRole,
    /// Text of the line
    pub text: String,
}

impl ChatTurn {
    /// A customer line
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// A DriveBot line
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// The generative collaborator used by the rental reducer
///
/// Object safe so the environment can hold `Arc<dyn Assistant>`.
pub trait Assistant: Send + Sync {
    /// Short marketing copy for a listing
    fn describe_car<'a>(&'a self, name: &'a str, model_year: i32, category: &'a str) -> BoxFuture<'a, String>;

    /// Answer `message` given the earlier conversation
    fn chat<'a>(&'a self, message: &'a str, history: &'a [ChatTurn]) -> BoxFuture<'a, String>;

    /// One-sentence visual prompt for a promo video
    fn video_script<'a>(&'a self, name: &'a str, category: &'a str) -> BoxFuture<'a, String>;

    /// Generate a promo video from a car photo, returning the video URI
    fn generate_video<'a>(&'a self, request: &'a VideoRequest) -> BoxFuture<'a, Result<String, AssistantError>>;
}

/// Assistant backed by the Claude Messages API and a video generation API
///
/// Either backend may be absent; calls then resolve to fallbacks (text) or
/// `AssistantError::MissingApiKey` (video) without touching the network.
#[derive(Clone, Debug, Default)]
pub struct GenerativeAssistant {
    text: Option<AnthropicClient>,
    video: Option<VideoClient>,
    text_model: Option<String>,
}

impl GenerativeAssistant {
    /// Create an assistant from optional backends
    #[must_use]
    pub const fn new(text: Option<AnthropicClient>, video: Option<VideoClient>) -> Self {
        Self {
            text,
            video,
            text_model: None,
        }
    }

    /// An assistant with no backends, answering only with fallbacks
    #[must_use]
    pub const fn offline() -> Self {
        Self::new(None, None)
    }

    /// Builder: Override the text model
    #[must_use]
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = Some(model.into());
        self
    }

    async fn complete(&self, request: MessagesRequest) -> Result<String, AssistantError> {
        let client = self
            .text
            .as_ref()
            .ok_or(AssistantError::MissingApiKey("ANTHROPIC_API_KEY"))?;
        let request = match &self.text_model {
            Some(model) => request.with_model(model.clone()),
            None => request,
        };
        let text = client.messages(request).await?.text();
        if text.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Conversation history in the shape the Messages API accepts
///
/// Leading DriveBot lines (the greeting) are dropped because a conversation
/// must open with a user turn.
fn history_messages(history: &[ChatTurn], message: &str) -> Vec<Message> {
    history
        .iter()
        .skip_while(|turn| turn.role == ChatRole::Model)
        .map(|turn| match turn.role {
            ChatRole::User => Message::user(turn.text.clone()),
            ChatRole::Model => Message::assistant(turn.text.clone()),
        })
        .chain(std::iter::once(Message::user(message)))
        .collect()
}

impl Assistant for GenerativeAssistant {
    fn describe_car<'a>(&'a self, name: &'a str, model_year: i32, category: &'a str) -> BoxFuture<'a, String> {
        async move {
            let request = MessagesRequest::new(vec![Message::user(prompts::description_prompt(
                name, model_year, category,
            ))]);
            match self.complete(request).await {
                Ok(text) => text,
                Err(AssistantError::EmptyResponse) => prompts::EMPTY_DESCRIPTION.to_string(),
                Err(error) => {
                    tracing::warn!(%error, car = name, "Description generation failed, using fallback");
                    prompts::description_fallback(name, model_year)
                },
            }
        }
        .boxed()
    }

    fn chat<'a>(&'a self, message: &'a str, history: &'a [ChatTurn]) -> BoxFuture<'a, String> {
        async move {
            let request =
                MessagesRequest::new(history_messages(history, message)).with_system(prompts::DRIVEBOT_SYSTEM);
            match self.complete(request).await {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!(%error, "Chat request failed, using fallback");
                    prompts::CHAT_FALLBACK.to_string()
                },
            }
        }
        .boxed()
    }

    fn video_script<'a>(&'a self, name: &'a str, category: &'a str) -> BoxFuture<'a, String> {
        async move {
            let request = MessagesRequest::new(vec![Message::user(prompts::video_script_prompt(name, category))])
                .with_max_tokens(200);
            match self.complete(request).await {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!(%error, car = name, "Video script generation failed, using fallback");
                    prompts::video_script_fallback(name)
                },
            }
        }
        .boxed()
    }

    fn generate_video<'a>(&'a self, request: &'a VideoRequest) -> BoxFuture<'a, Result<String, AssistantError>> {
        async move {
            let client = self
                .video
                .as_ref()
                .ok_or(AssistantError::MissingApiKey("VIDEO_API_KEY"))?;
            client.generate(request).await
        }
        .boxed()
    }
}
