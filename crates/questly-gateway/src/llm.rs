//! Model backend abstraction and implementations.
//!
//! Enum dispatch over the supported HTTP APIs, avoiding the
//! dyn-compatibility issues with async trait methods. Each backend turns a
//! [`RenderedPrompt`] into its own request body and pulls the reply text
//! back out of its own response shape. Only Gemini supports search
//! grounding; the other backends ignore [`RenderedPrompt::web_search`].

use questly_types::{ChatRole, WebSource};
use serde_json::{Value, json};

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::GatewayError;
use crate::prompt::RenderedPrompt;

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// Reply text plus any web pages it was grounded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Reply text.
    pub text: String,
    /// Grounding sources, empty unless the backend searched.
    pub sources: Vec<WebSource>,
}

impl Completion {
    const fn text_only(text: String) -> Self {
        Self {
            text,
            sources: Vec::new(),
        }
    }
}

/// A model backend that turns a prompt into response text.
pub enum LlmBackend {
    /// `OpenAI`-compatible chat completions API.
    OpenAi(HttpBackend),
    /// Anthropic Messages API.
    Anthropic(HttpBackend),
    /// Google Gemini `generateContent` API.
    Gemini(HttpBackend),
}

impl LlmBackend {
    /// Send a prompt and return the response text.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<Completion, GatewayError> {
        match self {
            Self::OpenAi(backend) => {
                let url = format!("{}/chat/completions", backend.api_url);
                let json = backend
                    .post(
                        "OpenAI",
                        &url,
                        &[("Authorization", format!("Bearer {}", backend.api_key))],
                        &openai_body(&backend.model, prompt),
                    )
                    .await?;
                extract_openai_content(&json).map(Completion::text_only)
            }
            Self::Anthropic(backend) => {
                let url = format!("{}/messages", backend.api_url);
                let json = backend
                    .post(
                        "Anthropic",
                        &url,
                        &[
                            ("x-api-key", backend.api_key.clone()),
                            ("anthropic-version", String::from("2023-06-01")),
                        ],
                        &anthropic_body(&backend.model, prompt),
                    )
                    .await?;
                extract_anthropic_content(&json).map(Completion::text_only)
            }
            Self::Gemini(backend) => {
                let url = format!("{}/models/{}:generateContent", backend.api_url, backend.model);
                let json = backend
                    .post(
                        "Gemini",
                        &url,
                        &[("x-goog-api-key", backend.api_key.clone())],
                        &gemini_body(prompt),
                    )
                    .await?;
                Ok(Completion {
                    text: extract_gemini_content(&json)?,
                    sources: extract_gemini_sources(&json),
                })
            }
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
            Self::Gemini(_) => "gemini",
        }
    }

    /// Model identifier recorded on chat replies.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(b) | Self::Anthropic(b) | Self::Gemini(b) => &b.model,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared HTTP plumbing
// ---------------------------------------------------------------------------

/// Connection state shared by all backend flavours.
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpBackend {
    /// Create a backend from configuration.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// POST a JSON body and return the JSON response.
    async fn post(
        &self,
        provider: &str,
        url: &str,
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<Value, GatewayError> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Backend(format!("{provider} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(GatewayError::Backend(format!(
                "{provider} returned {status}: {error_body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Backend(format!("{provider} response parse failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible
// ---------------------------------------------------------------------------

const fn openai_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "assistant",
    }
}

/// Request body for `/chat/completions`.
fn openai_body(model: &str, prompt: &RenderedPrompt) -> Value {
    let mut messages = vec![json!({"role": "system", "content": prompt.system})];
    messages.extend(
        prompt
            .turns
            .iter()
            .map(|t| json!({"role": openai_role(t.role), "content": t.text})),
    );
    messages.push(json!({"role": "user", "content": prompt.user}));

    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": 0.7,
        "max_tokens": prompt.max_tokens,
    });
    if prompt.expect_json
        && let Some(obj) = body.as_object_mut()
    {
        obj.insert(
            String::from("response_format"),
            json!({"type": "json_object"}),
        );
    }
    body
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &Value) -> Result<String, GatewayError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            GatewayError::Backend("OpenAI response missing choices[0].message.content".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API
// ---------------------------------------------------------------------------

/// Request body for `/messages`. System is a top-level field.
fn anthropic_body(model: &str, prompt: &RenderedPrompt) -> Value {
    let mut messages: Vec<Value> = prompt
        .turns
        .iter()
        .map(|t| json!({"role": openai_role(t.role), "content": t.text}))
        .collect();
    messages.push(json!({"role": "user", "content": prompt.user}));

    json!({
        "model": model,
        "max_tokens": prompt.max_tokens,
        "system": prompt.system,
        "messages": messages,
    })
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &Value) -> Result<String, GatewayError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            GatewayError::Backend("Anthropic response missing content[0].text".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Gemini generateContent
// ---------------------------------------------------------------------------

/// Request body for `models/{model}:generateContent`.
fn gemini_body(prompt: &RenderedPrompt) -> Value {
    let mut contents: Vec<Value> = prompt
        .turns
        .iter()
        .map(|t| json!({"role": t.role.as_str(), "parts": [{"text": t.text}]}))
        .collect();
    contents.push(json!({"role": "user", "parts": [{"text": prompt.user}]}));

    let mut generation = json!({"maxOutputTokens": prompt.max_tokens});
    if prompt.expect_json
        && let Some(obj) = generation.as_object_mut()
    {
        obj.insert(
            String::from("responseMimeType"),
            json!("application/json"),
        );
    }

    let mut body = json!({
        "systemInstruction": {"parts": [{"text": prompt.system}]},
        "contents": contents,
        "generationConfig": generation,
    });
    if prompt.web_search
        && let Some(obj) = body.as_object_mut()
    {
        obj.insert(String::from("tools"), json!([{"googleSearch": {}}]));
    }
    body
}

/// Extract the text from a Gemini response, joining multi-part replies.
fn extract_gemini_content(json: &Value) -> Result<String, GatewayError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GatewayError::Backend("Gemini response missing candidates[0].content.parts".to_owned())
        })?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(GatewayError::Backend("Gemini response has no text parts".to_owned()));
    }
    Ok(text)
}

/// Web pages listed in `candidates[0].groundingMetadata.groundingChunks`.
///
/// Chunks without a `web.uri` are skipped.
fn extract_gemini_sources(json: &Value) -> Vec<WebSource> {
    json.pointer("/candidates/0/groundingMetadata/groundingChunks")
        .and_then(Value::as_array)
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.get("web")?;
                    let uri = web.get("uri").and_then(Value::as_str)?;
                    Some(WebSource {
                        uri: uri.to_owned(),
                        title: web.get("title").and_then(Value::as_str).map(str::to_owned),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create a backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    let http = HttpBackend::new(config);
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(http),
        BackendType::Anthropic => LlmBackend::Anthropic(http),
        BackendType::Gemini => LlmBackend::Gemini(http),
    }
}
