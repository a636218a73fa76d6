//! HTTP behaviour of the assistant clients against a mock server

use driveeasy_assistant::{
    Assistant, AssistantError, AnthropicClient, ChatTurn, GenerativeAssistant, VideoClient, VideoRequest,
    prompts,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_01",
        "model": "claude-sonnet-4-5-20250929",
        "content": [{ "type": "text", "text": text }],
        "usage": { "input_tokens": 10, "output_tokens": 20 }
    })
}

fn text_assistant(server: &MockServer) -> GenerativeAssistant {
    let client = AnthropicClient::new("test-key".to_string()).with_base_url(server.uri());
    GenerativeAssistant::new(Some(client), None)
}

fn car_photo() -> VideoRequest {
    VideoRequest {
        image: b"fake-jpeg".to_vec(),
        mime_type: "image/jpeg".to_string(),
        prompt: None,
    }
}

#[tokio::test]
async fn description_comes_from_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Silent, quick and roomy.")))
        .expect(1)
        .mount(&server)
        .await;

    let text = text_assistant(&server).describe_car("Tesla Model 3", 2023, "Sedan").await;
    assert_eq!(text, "Silent, quick and roomy.");
}

#[tokio::test]
async fn empty_description_uses_generic_copy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("   ")))
        .mount(&server)
        .await;

    let text = text_assistant(&server).describe_car("Tesla Model 3", 2023, "Sedan").await;
    assert_eq!(text, prompts::EMPTY_DESCRIPTION);
}

#[tokio::test]
async fn server_error_falls_back_to_named_copy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let assistant = text_assistant(&server);
    assert_eq!(
        assistant.describe_car("Range Rover Sport", 2022, "SUV").await,
        "Enjoy your ride with this 2022 Range Rover Sport."
    );
    assert_eq!(assistant.chat("hi", &[]).await, prompts::CHAT_FALLBACK);
    assert_eq!(
        assistant.video_script("Range Rover Sport", "SUV").await,
        prompts::video_script_fallback("Range Rover Sport")
    );
}

#[tokio::test]
async fn chat_sends_persona_and_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(serde_json::json!({
            "system": prompts::DRIVEBOT_SYSTEM,
            "messages": [
                { "role": "user", "content": [{ "type": "text", "text": "Any SUVs?" }] },
                { "role": "assistant", "content": [{ "type": "text", "text": "The Range Rover Sport." }] },
                { "role": "user", "content": [{ "type": "text", "text": "Price?" }] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("$250/day.")))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![
        ChatTurn::model(driveeasy_assistant::CHAT_GREETING),
        ChatTurn::user("Any SUVs?"),
        ChatTurn::model("The Range Rover Sport."),
    ];
    let reply = text_assistant(&server).chat("Price?", &history).await;
    assert_eq!(reply, "$250/day.");
}

#[tokio::test]
async fn rate_limit_maps_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = AnthropicClient::new("k".to_string()).with_base_url(server.uri());
    let result = client
        .messages(driveeasy_assistant::MessagesRequest::new(vec![
            driveeasy_assistant::Message::user("hi"),
        ]))
        .await;
    assert!(matches!(result, Err(AssistantError::RateLimited)));
}

#[tokio::test]
async fn video_is_polled_until_done() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/veo-3.1-fast-generate-preview:predictLongRunning"))
        .and(header("x-goog-api-key", "video-key"))
        .and(body_partial_json(serde_json::json!({
            "instances": [{
                "prompt": driveeasy_assistant::video::DEFAULT_VIDEO_PROMPT,
                "image": { "bytesBase64Encoded": "ZmFrZS1qcGVn", "mimeType": "image/jpeg" }
            }],
            "parameters": { "numberOfVideos": 1, "resolution": "720p", "aspectRatio": "16:9" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/op-1",
            "done": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    // First poll still running, second one finished.
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/op-1",
            "done": false
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/op-1",
            "done": true,
            "response": { "generatedVideos": [{ "video": { "uri": "https://videos.example/op-1.mp4" } }] }
        })))
        .mount(&server)
        .await;

    let client = VideoClient::new("video-key".to_string())
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(10));
    let assistant = GenerativeAssistant::new(None, Some(client));

    let uri = assistant.generate_video(&car_photo()).await.unwrap();
    assert_eq!(uri, "https://videos.example/op-1.mp4");
}

#[tokio::test]
async fn video_rejection_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("no key"))
        .mount(&server)
        .await;

    let client = VideoClient::new("bad".to_string()).with_base_url(server.uri());
    let result = client.generate(&car_photo()).await;
    assert!(matches!(result, Err(AssistantError::Unauthorized)));
}
