//! Text generation collaborator.
//!
//! The service is opaque: a prompt goes in, free text or a categorized
//! failure comes out. Callers trim the text and store it verbatim.

mod gemini;
mod inflight;
pub mod prompts;
#[cfg(test)]
mod scripted;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;
pub use inflight::{InFlight, Target, Ticket};
#[cfg(test)]
pub use scripted::ScriptedGenerator;

/// Failure categories surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No API key is configured.
    #[error("text generation API key is not configured")]
    MissingCredential,

    /// The service rejected the API key.
    #[error("text generation API key was rejected: {0}")]
    InvalidCredential(String),

    /// The service could not be reached.
    #[error("network error while contacting text generation service: {0}")]
    Network(String),

    /// Any other failure.
    #[error("text generation failed: {0}")]
    Failed(String),
}

impl GenerationError {
    /// Message shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredential => "مفتاح API غير مهيأ. يرجى الاتصال بالمسؤول.",
            Self::InvalidCredential(_) => "مفتاح API غير صالح. يرجى الاتصال بالمسؤول.",
            Self::Network(_) => "خطأ في الشبكة. يرجى التحقق من اتصالك بالإنترنت.",
            Self::Failed(_) => "حدث خطأ أثناء إنشاء التحليل. يرجى المحاولة مرة أخرى لاحقًا.",
        }
    }

    /// Short category name for logs.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential(_) => "invalid_credential",
            Self::Network(_) => "network",
            Self::Failed(_) => "failed",
        }
    }

    /// Categorize a failure from its message text.
    ///
    /// Messages mentioning an API key are credential failures; messages
    /// mentioning fetch or network are network failures.
    #[must_use]
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("api key") || lower.contains("api_key") {
            Self::InvalidCredential(message)
        } else if lower.contains("fetch") || lower.contains("network") {
            Self::Network(message)
        } else {
            Self::Failed(message)
        }
    }
}

/// A service that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Generate text for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a categorized [`GenerationError`] when generation fails.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
