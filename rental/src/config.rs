//! Configuration for the DriveEasy binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use driveeasy_assistant::video::{DEFAULT_VIDEO_API_URL, DEFAULT_VIDEO_MODEL};
use driveeasy_assistant::{AnthropicClient, GenerativeAssistant, VideoClient};
use serde::{Deserialize, Serialize};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where collections are stored
    pub storage: StorageConfig,
    /// Process settings
    pub app: AppConfig,
    /// Generative assistant settings
    pub assistant: AssistantConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per key
    pub data_dir: PathBuf,
}

/// Process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log filter (trace, debug, info, warn, error or an `EnvFilter` directive)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Assistant configuration
///
/// Missing keys leave the matching feature on its fallbacks.
#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Key for the text model
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,
    /// Text model override
    pub text_model: Option<String>,
    /// Key for the video model
    #[serde(skip_serializing)]
    pub video_api_key: Option<String>,
    /// Video model name
    pub video_model: String,
    /// Video API base URL
    pub video_api_url: String,
    /// Seconds between video operation polls
    pub video_poll_interval: u64,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("text_model", &self.text_model)
            .field("video_api_key", &self.video_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("video_model", &self.video_model)
            .field("video_api_url", &self.video_api_url)
            .field("video_poll_interval", &self.video_poll_interval)
            .finish()
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any variable source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            storage: StorageConfig {
                data_dir: lookup("DRIVEEASY_DATA_DIR")
                    .map_or_else(|| PathBuf::from("./driveeasy-data"), PathBuf::from),
            },
            app: AppConfig {
                log_level: lookup("RUST_LOG").unwrap_or_else(|| "info,driveeasy=debug".to_string()),
                shutdown_timeout: parsed(&lookup, "SHUTDOWN_TIMEOUT", 5),
            },
            assistant: AssistantConfig {
                anthropic_api_key: non_empty(&lookup, "ANTHROPIC_API_KEY"),
                text_model: non_empty(&lookup, "DRIVEEASY_TEXT_MODEL"),
                video_api_key: non_empty(&lookup, "VIDEO_API_KEY"),
                video_model: lookup("VIDEO_MODEL").unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
                video_api_url: lookup("VIDEO_API_URL").unwrap_or_else(|| DEFAULT_VIDEO_API_URL.to_string()),
                video_poll_interval: parsed(&lookup, "VIDEO_POLL_INTERVAL", 5),
            },
        }
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.app.shutdown_timeout)
    }
}

impl AssistantConfig {
    /// Builds the assistant; features without a key run on fallbacks
    #[must_use]
    pub fn build(&self) -> GenerativeAssistant {
        let text = self.anthropic_api_key.clone().map(AnthropicClient::new);
        let video = self.video_api_key.clone().map(|key| {
            VideoClient::new(key)
                .with_base_url(self.video_api_url.clone())
                .with_model(self.video_model.clone())
                .with_poll_interval(Duration::from_secs(self.video_poll_interval))
        });
        if text.is_none() {
            tracing::warn!("ANTHROPIC_API_KEY not set, text features use fallback copy");
        }
        if video.is_none() {
            tracing::warn!("VIDEO_API_KEY not set, video generation is disabled");
        }
        let assistant = GenerativeAssistant::new(text, video);
        match &self.text_model {
            Some(model) => assistant.with_text_model(model.clone()),
            None => assistant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.storage.data_dir, PathBuf::from("./driveeasy-data"));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.app.log_level, "info,driveeasy=debug");
        assert!(config.assistant.anthropic_api_key.is_none());
        assert_eq!(config.assistant.video_model, DEFAULT_VIDEO_MODEL);
        assert_eq!(config.assistant.video_poll_interval, 5);
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from(&[
            ("DRIVEEASY_DATA_DIR", "/tmp/driveeasy"),
            ("SHUTDOWN_TIMEOUT", "12"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("DRIVEEASY_TEXT_MODEL", "claude-test"),
            ("VIDEO_POLL_INTERVAL", "1"),
        ]);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/driveeasy"));
        assert_eq!(config.app.shutdown_timeout, 12);
        assert_eq!(config.assistant.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.assistant.text_model.as_deref(), Some("claude-test"));
        assert_eq!(config.assistant.video_poll_interval, 1);
    }

    #[test]
    fn unparsable_numbers_and_blank_keys_fall_back() {
        let config = config_from(&[("SHUTDOWN_TIMEOUT", "soon"), ("VIDEO_API_KEY", "  ")]);
        assert_eq!(config.app.shutdown_timeout, 5);
        assert!(config.assistant.video_api_key.is_none());
    }

    #[test]
    fn debug_output_hides_keys() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "sk-secret")]);
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
