//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GenerationError, TextGenerator};
use crate::config::GenerationConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
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

/// HTTP client for the Gemini text-generation API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Build a client.
    ///
    /// A missing or blank key is accepted here and reported on first use as
    /// [`GenerationError::MissingCredential`].
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Failed`] if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Failed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Failed`] if the HTTP client cannot be built.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        Self::new(
            config.resolved_api_key(),
            config.model.clone(),
            config.endpoint.clone(),
            config.timeout(),
        )
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

fn transport_error(err: &reqwest::Error) -> GenerationError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        GenerationError::Network(err.to_string())
    } else {
        GenerationError::Failed(err.to_string())
    }
}

fn status_error(status: reqwest::StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map_or_else(|_| format!("HTTP {status}"), |e| e.error.message);
    match status.as_u16() {
        401 | 403 => GenerationError::InvalidCredential(message),
        _ => GenerationError::classify(message),
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)?;

        debug!(model = %self.model, prompt_len = prompt.len(), "sending generation request");
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(&e))?;
        if !status.is_success() {
            let err = status_error(status, &text);
            warn!(category = err.category(), %status, "generation request failed");
            return Err(err);
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Failed(format!("unexpected response: {e}")))?;
        let output: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if output.trim().is_empty() {
            return Err(GenerationError::Failed("empty response".to_string()));
        }
        debug!(chars = output.chars().count(), "generation request succeeded");
        Ok(output)
    }
}
