//! Generation adapter
//!
//! The pipeline only knows [`Generator`]: one prompt in, one text out, typed
//! failure. [`GeminiGenerator`] implements it over the Gemini
//! `generateContent` REST endpoint with a bounded per-request timeout and an
//! explicit [`RetryPolicy`].

use crate::config::GeneratorConfig;
use crate::retry::{AttemptError, RetryPolicy};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use trimsight_core::{Error, Result};

const MAX_ERROR_DETAIL: usize = 300;

/// Text-completion boundary consumed by the query pipeline.
///
/// Implementations must not share mutable state between calls; concurrent
/// queries each get their own future.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl GeminiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let api_key = config.api_key.clone().unwrap_or_default();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            url,
            api_key,
            retry: config.retry,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_once(&self, prompt: &str, attempt: u32) -> std::result::Result<String, AttemptError> {
        tracing::debug!(attempt, url = %self.url, "calling generation service");

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {}: {}", status, error_detail(&body));
            return Err(if is_retryable(status) {
                AttemptError::Transient(message)
            } else {
                AttemptError::Permanent(message)
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Permanent(format!("malformed response: {}", e)))?;

        parsed
            .text()
            .ok_or_else(|| AttemptError::Permanent("response contained no text".to_string()))
    }
}

impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.retry
            .run(move |attempt| self.send_once(prompt, attempt))
            .await
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Prefer the service's own error message over the raw body
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    detail.chars().take(MAX_ERROR_DETAIL).collect()
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
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

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
