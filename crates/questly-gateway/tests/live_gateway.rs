//! Drives [`LlmGateway`] against a local stand-in for a model API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::routing::post;
use questly_gateway::fallback;
use questly_gateway::{AiGateway, BackendType, GatewayConfig, GatewayError, LlmBackendConfig, LlmGateway};
use tokio::net::TcpListener;

/// Serve a canned OpenAI-style completion, returning the base URL.
async fn serve_once(body: serde_json::Value, delay: Duration) -> String {
    let router = Router::new().route(
        "/chat/completions",
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(body)
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

/// Serve a canned Gemini reply for `test-model`, recording each request body.
async fn serve_gemini(body: serde_json::Value) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);
    let router = Router::new().route(
        "/models/test-model:generateContent",
        post(move |Json(request): Json<serde_json::Value>| async move {
            recorded.lock().unwrap().push(request);
            Json(body)
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    (format!("http://{addr}"), seen)
}

fn gateway(api_url: String, timeout: Duration) -> LlmGateway {
    let mut config = GatewayConfig::new(LlmBackendConfig {
        backend_type: BackendType::OpenAi,
        api_url,
        api_key: String::from("test-key"),
        model: String::from("test-model"),
    });
    config.timeout = timeout;
    LlmGateway::new(&config).unwrap()
}

fn openai_reply(content: &str) -> serde_json::Value {
    serde_json::json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

#[tokio::test]
async fn suggestions_round_trip_through_openai_shape() {
    let content = r#"{"tasks": [
        {"title": "Outline chapter 3", "description": "Bullet the key ideas", "category": "Study"},
        {"title": "Do 10 practice problems", "description": "From the problem set", "category": "Study"},
        {"title": "Teach it back", "description": "Explain to a friend", "category": "Other"}
    ]}"#;
    let url = serve_once(openai_reply(content), Duration::ZERO).await;
    let suggestions = gateway(url, Duration::from_secs(5))
        .suggest_tasks("Ace the physics midterm")
        .await
        .unwrap();
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0].title, "Outline chapter 3");
}

#[tokio::test]
async fn chat_reply_records_model() {
    let url = serve_once(openai_reply("Entropy measures disorder."), Duration::ZERO).await;
    let reply = gateway(url, Duration::from_secs(5))
        .chat("What is entropy?", &[], "Strict")
        .await
        .unwrap();
    assert_eq!(reply.text, "Entropy measures disorder.");
    assert_eq!(reply.model_used, "test-model");
    assert!(reply.sources.is_empty());
}

#[tokio::test]
async fn gemini_chat_searches_and_returns_sources() {
    let reply = serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "A limit is the value approached."}]},
            "groundingMetadata": {"groundingChunks": [
                {"web": {"uri": "https://example.org/limits", "title": "Limits"}}
            ]}
        }]
    });
    let (url, seen) = serve_gemini(reply).await;
    let mut config = GatewayConfig::new(LlmBackendConfig {
        backend_type: BackendType::Gemini,
        api_url: url,
        api_key: String::from("test-key"),
        model: String::from("test-model"),
    });
    config.timeout = Duration::from_secs(5);
    let gateway = LlmGateway::new(&config).unwrap();

    let reply = gateway.chat("What is a limit?", &[], "Strict").await.unwrap();
    assert_eq!(reply.text, "A limit is the value approached.");
    assert_eq!(reply.sources.len(), 1);
    assert_eq!(reply.sources[0].uri, "https://example.org/limits");

    gateway.progress_nudge(1, 2).await.ok();
    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["tools"], serde_json::json!([{"googleSearch": {}}]));
    assert!(requests[1].get("tools").is_none());
}

#[tokio::test]
async fn slow_backend_times_out_and_falls_back() {
    let url = serve_once(openai_reply("too late"), Duration::from_secs(5)).await;
    let result = gateway(url, Duration::from_millis(200))
        .progress_nudge(2, 5)
        .await;
    assert!(matches!(result, Err(GatewayError::Timeout(_))));

    let nudge = fallback::resolve("progress_nudge", result, || fallback::NUDGE.to_owned());
    assert_eq!(nudge, "Consistency is the path to mastery.");
}

#[tokio::test]
async fn unparseable_challenge_is_a_parse_error() {
    let url = serve_once(openai_reply("Sorry, I can't do that."), Duration::ZERO).await;
    let result = gateway(url, Duration::from_secs(5))
        .mastery_challenge("Thermodynamics")
        .await;
    assert!(matches!(result, Err(GatewayError::Parse(_))));
    let challenge = fallback::resolve("mastery_challenge", result, fallback::mastery_challenge);
    assert_eq!(challenge.next_quest.title, "Knowledge Review");
}
