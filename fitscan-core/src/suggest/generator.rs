//! Generative text API access.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generative Language API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerateError {
    #[error("Generation timed out")]
    Timeout,
    #[error("Generation request failed: {0}")]
    Transport(String),
    #[error("Generative API returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Generative API returned no text")]
    EmptyResponse,
    #[error("Failed to decode generative API response: {0}")]
    MalformedBody(String),
}

/// Single-shot text completion.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerateError>> + Send;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout: DEFAULT_GENERATE_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Gemini `generateContent` client. The API key travels in the
/// `x-goog-api-key` header, never in the URL.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.config.model, "Sending generate request");

        let response = self
            .http
            .post(self.build_url())
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerateError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| GenerateError::MalformedBody(e.to_string()))?;

        let text: String = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(GenerateError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

fn classify(error: reqwest::Error) -> GenerateError {
    if error.is_timeout() {
        GenerateError::Timeout
    } else {
        GenerateError::Transport(error.to_string())
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.complete(prompt).await
    }
}
