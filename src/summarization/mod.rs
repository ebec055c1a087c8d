//! Abstractions for generating structured article summaries via a hosted LLM.
//!
//! The processing layer only sees the [`SummarizationClient`] trait. The Gemini-backed client
//! issues REST calls directly with `reqwest`, and [`prompt`] owns the fixed instruction and
//! response schema sent with every request.

mod gemini;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Errors surfaced while requesting a summary from the provider.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// No API key was configured, so no client could be built.
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    /// Provider answered with a non-success status (bad key, quota, malformed request).
    #[error("provider returned {status}: {message}")]
    Api {
        /// HTTP status code reported by the provider.
        status: u16,
        /// Provider error message, or the raw body when it was not JSON.
        message: String,
    },
    /// Request never produced a response (DNS, TLS, connection reset).
    #[error("failed to reach provider: {0}")]
    Transport(String),
    /// Provider response could not be decoded or carried no text.
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Payload passed to the summarization provider.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// System instruction constraining the model's output.
    pub instruction: String,
    /// Task prompt placed before the article in the user turn.
    pub prompt: String,
    /// Article text to summarize.
    pub article: String,
    /// JSON schema the response must conform to.
    pub schema: Value,
}

/// Interface implemented by structured-summary providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate the JSON-encoded summary text for the request.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Shape the provider is asked to produce.
///
/// Responses are passed through untouched; this type exists for callers that want to decode
/// the `result` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Prose summary of the article.
    pub summary: String,
    /// Main keywords, most relevant first.
    pub keywords: Vec<String>,
    /// Generated question/answer pairs.
    pub faqs: Vec<FaqPair>,
}

/// A single generated FAQ entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqPair {
    /// Question derived from the article.
    pub question: String,
    /// Answer grounded in the article.
    pub answer: String,
}
