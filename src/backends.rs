//! Text-generation backends.
//!
//! Concrete blocking HTTP implementations of [`TextGeneration`]:
//! - **[`OpenAiBackend`]**: `POST /v1/chat/completions` on the OpenAI API.
//! - **[`GeminiBackend`]**: `generateContent` on the Google Generative Language API.
//! - **[`OllamaBackend`]**: `POST /api/chat` on a local Ollama server.
//!
//! Use [`create_backend`] to pick the backend matching a resolved
//! [`ProviderConfig`].
//!
//! Backends never retry. Any failure (missing API key, network error,
//! non-success status, unexpected response shape) is returned as an error
//! and turned into a displayable reply by the assistant.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::time::Duration;

use nutriscan_core::generation::{ChatMessage, GenerationRequest, TextGeneration};
use nutriscan_core::models::Role;
use nutriscan_core::provider::{ProviderConfig, ProviderId, API_BASE_KEY, DEFAULT_OLLAMA_API_BASE};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Accepted when [`GEMINI_API_KEY_ENV`] is unset.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

fn env_key(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Send a JSON body and return the parsed JSON response, failing on any
/// non-success status with the response body in the message.
fn post_json(
    request: reqwest::blocking::RequestBuilder,
    body: &Value,
    provider: &str,
) -> Result<Value> {
    // Transport errors carry the request URL; keep it out of messages.
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("{} request failed", provider))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().unwrap_or_default();
        bail!("{} API error {}: {}", provider, status, body_text);
    }

    response
        .json()
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("Invalid {} response body", provider))
}

// ============ OpenAI Backend ============

/// Chat completions on the OpenAI API.
///
/// Requires `OPENAI_API_KEY`; when it is missing, every call fails.
pub struct OpenAiBackend {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
}

impl OpenAiBackend {
    pub fn new(timeout_secs: u64, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key,
        })
    }
}

impl TextGeneration for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", OPENAI_API_KEY_ENV))?;

        let body = openai_request_body(request);
        let json = post_json(
            self.client.post(OPENAI_URL).bearer_auth(api_key),
            &body,
            "OpenAI",
        )?;
        parse_openai_response(&json)
    }
}

pub fn openai_request_body(request: &GenerationRequest) -> Value {
    json!({
        "model": request.model,
        "messages": request.messages,
        "temperature": request.temperature,
    })
}

/// Extract `choices[0].message.content`.
pub fn parse_openai_response(json: &Value) -> Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message.content"))
}

// ============ Gemini Backend ============

/// `generateContent` on the Google Generative Language API.
///
/// Requires `GEMINI_API_KEY` (or `GOOGLE_API_KEY`).
/// The key travels in the `x-goog-api-key` header, never in the URL.
pub struct GeminiBackend {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(timeout_secs: u64, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key,
            base_url: GEMINI_URL.to_string(),
        })
    }

    /// Point the backend at another `.../models` base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl TextGeneration for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", GEMINI_API_KEY_ENV))?;

        let url = format!("{}/{}:generateContent", self.base_url, request.model);
        let body = gemini_request_body(request);
        let json = post_json(
            self.client.post(url).header("x-goog-api-key", api_key),
            &body,
            "Gemini",
        )?;
        parse_gemini_response(&json)
    }
}

/// System turns become `systemInstruction`; assistant turns use role `model`.
pub fn gemini_request_body(request: &GenerationRequest) -> Value {
    let system: Vec<Value> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| json!({ "text": m.content }))
        .collect();

    let contents: Vec<Value> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = if m.role == Role::Assistant { "model" } else { "user" };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": { "temperature": request.temperature },
    });
    if !system.is_empty() {
        body["systemInstruction"] = json!({ "parts": system });
    }
    body
}

/// Concatenate `candidates[0].content.parts[*].text`.
pub fn parse_gemini_response(json: &Value) -> Result<String> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response: missing candidates[0].content.parts"))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        bail!("Invalid Gemini response: no text parts");
    }
    Ok(text)
}

// ============ Ollama Backend ============

/// `POST /api/chat` on a local Ollama instance.
///
/// The server URL comes from the request's `api_base` extra parameter
/// (default: `http://localhost:11434`). Requires the model to be pulled
/// (e.g. `ollama pull mistral`).
pub struct OllamaBackend {
    client: reqwest::blocking::Client,
}

impl OllamaBackend {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
        })
    }
}

impl TextGeneration for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let base = request
            .extra
            .get(API_BASE_KEY)
            .map(String::as_str)
            .unwrap_or(DEFAULT_OLLAMA_API_BASE);

        let body = ollama_request_body(request);
        let json = post_json(
            self.client.post(format!("{}/api/chat", base)),
            &body,
            "Ollama",
        )
        .with_context(|| format!("is Ollama running at {}?", base))?;
        parse_ollama_response(&json)
    }
}

pub fn ollama_request_body(request: &GenerationRequest) -> Value {
    json!({
        "model": request.model,
        "messages": request.messages,
        "stream": false,
        "options": { "temperature": request.temperature },
    })
}

/// Extract `message.content`.
pub fn parse_ollama_response(json: &Value) -> Result<String> {
    json.pointer("/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing message.content"))
}

/// Create the [`TextGeneration`] backend for a resolved provider.
///
/// | Provider | Backend |
/// |----------|---------|
/// | `openai` | [`OpenAiBackend`] |
/// | `gemini` | [`GeminiBackend`] |
/// | `ollama` | [`OllamaBackend`] |
///
/// API keys are read from the environment here, once. A missing key does not
/// fail construction; it fails each call instead.
pub fn create_backend(config: &ProviderConfig, timeout_secs: u64) -> Result<Box<dyn TextGeneration>> {
    let backend: Box<dyn TextGeneration> = match config.provider {
        ProviderId::OpenAi => Box::new(OpenAiBackend::new(
            timeout_secs,
            env_key(&[OPENAI_API_KEY_ENV]),
        )?),
        ProviderId::Gemini => Box::new(GeminiBackend::new(
            timeout_secs,
            env_key(&[GEMINI_API_KEY_ENV, GOOGLE_API_KEY_ENV]),
        )?),
        ProviderId::Ollama => Box::new(OllamaBackend::new(timeout_secs)?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request(messages: Vec<ChatMessage>) -> GenerationRequest {
        GenerationRequest {
            model: "test-model".to_string(),
            messages,
            temperature: 0.8,
            extra: BTreeMap::new(),
        }
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are a nutrition assistant."),
            ChatMessage::user("Question 1"),
            ChatMessage {
                role: Role::Assistant,
                content: "Answer 1".to_string(),
            },
            ChatMessage::user("Question 2"),
        ]
    }

    #[test]
    fn test_openai_request_body() {
        let body = openai_request_body(&request(conversation()));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"].as_array().unwrap().len(), 4);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][2]["role"], "assistant");
        assert!((body["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_parse_openai_response() {
        let json = json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Hello" } }]
        });
        assert_eq!(parse_openai_response(&json).unwrap(), "Hello");
        assert!(parse_openai_response(&json!({ "choices": [] })).is_err());
    }

    #[test]
    fn test_gemini_request_body_maps_roles() {
        let body = gemini_request_body(&request(conversation()));
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "Answer 1");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a nutrition assistant."
        );
        assert!(body["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_gemini_request_body_without_system() {
        let body = gemini_request_body(&request(vec![ChatMessage::user("Hi")]));
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_gemini_response() {
        let json = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Part one. " }, { "text": "Part two." }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_gemini_response(&json).unwrap(), "Part one. Part two.");
        assert!(parse_gemini_response(&json!({ "candidates": [] })).is_err());
    }

    #[test]
    fn test_ollama_request_body() {
        let body = ollama_request_body(&request(conversation()));
        assert_eq!(body["stream"], false);
        assert!(body["options"]["temperature"].is_number());
        assert_eq!(body["messages"][3]["content"], "Question 2");
    }

    #[test]
    fn test_parse_ollama_response() {
        let json = json!({ "model": "mistral", "message": { "role": "assistant", "content": "Bonjour" }, "done": true });
        assert_eq!(parse_ollama_response(&json).unwrap(), "Bonjour");
        assert!(parse_ollama_response(&json!({ "error": "model not found" })).is_err());
    }

    #[test]
    fn test_missing_api_key_fails_at_dispatch() {
        let backend = OpenAiBackend::new(5, None).unwrap();
        let err = backend
            .generate(&request(vec![ChatMessage::user("Hi")]))
            .unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY_ENV));
    }

    #[test]
    fn test_unreachable_ollama_reports_endpoint() {
        let backend = OllamaBackend::new(2).unwrap();
        let mut req = request(vec![ChatMessage::user("Hi")]);
        req.extra
            .insert(API_BASE_KEY.to_string(), "http://127.0.0.1:9".to_string());
        let err = backend.generate(&req).unwrap_err();
        assert!(format!("{:#}", err).contains("127.0.0.1:9"));
    }

    #[test]
    fn test_gemini_failure_never_reveals_api_key() {
        use nutriscan_core::assistant::NutritionAssistant;
        use nutriscan_core::normalize::normalize;

        let backend = GeminiBackend::new(2, Some("SECRET-KEY-123".to_string()))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v1beta/models/");
        let config = ProviderConfig {
            provider: ProviderId::Gemini,
            model: "gemini-2.0-flash".to_string(),
            extra: BTreeMap::new(),
        };
        let mut assistant = NutritionAssistant::new(config, Box::new(backend));

        let product = normalize(&json!({ "product_name": "Nutella", "nutriscore_grade": "e" }));
        let analysis = assistant.analyze_product(&product);
        let reply = assistant.chat("Is it healthy?", "");

        for failed in [&analysis, &reply] {
            assert!(failed.is_failure());
            assert!(failed.text().contains("Gemini request failed"));
            assert!(!failed.text().contains("SECRET-KEY-123"), "{}", failed.text());
        }
    }

    #[test]
    fn test_create_backend_matches_provider() {
        for provider in ProviderId::ALL {
            let config = ProviderConfig {
                provider,
                model: provider.default_model().to_string(),
                extra: BTreeMap::new(),
            };
            let backend = create_backend(&config, 5).unwrap();
            assert_eq!(backend.name(), provider.as_str());
        }
    }
}
