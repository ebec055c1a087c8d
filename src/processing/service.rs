//! Summary service coordinating input resolution, extraction, and the provider call.

use crate::{
    config::Config,
    extraction::{extract_pdf_text_blocking, is_pdf_filename},
    processing::types::{
        ArticleInput, ArticleSource, InputError, ProcessingError, SummaryOutcome,
    },
    summarization::{GeminiClient, SummarizationClient, prompt::build_request},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Runs one article through the summarization pipeline.
///
/// The provider client is built once at start-up and never mutated. When it could not be
/// built the service still serves requests, failing each one with
/// [`ProcessingError::ClientUnavailable`]. Share the service through an `Arc`.
pub struct SummaryService {
    client: Option<Arc<dyn SummarizationClient>>,
    language: String,
}

/// Abstraction over the summarization pipeline used by the HTTP surface.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Fail fast when the provider client is unavailable.
    fn ensure_ready(&self) -> Result<(), ProcessingError>;

    /// Resolve the article text and request its structured summary.
    async fn summarize(&self, input: ArticleInput) -> Result<SummaryOutcome, ProcessingError>;
}

impl SummaryService {
    /// Build a service around an already constructed client (or its absence).
    pub fn new(client: Option<Arc<dyn SummarizationClient>>, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
        }
    }

    /// Build the Gemini client from configuration, degrading instead of failing.
    pub fn from_config(config: &Config) -> Self {
        let client: Option<Arc<dyn SummarizationClient>> = match GeminiClient::from_config(config)
        {
            Ok(client) => {
                tracing::info!(model = %config.gemini_model, "Gemini client initialized");
                Some(Arc::new(client))
            }
            Err(error) => {
                tracing::error!(%error, "Failed to initialize Gemini client; summaries disabled");
                None
            }
        };
        Self::new(client, config.summary_language.clone())
    }

    /// Whether the provider client is available.
    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn resolve_text(
        &self,
        input: ArticleInput,
    ) -> Result<(String, ArticleSource), ProcessingError> {
        let ArticleInput { file, article_text } = input;

        let (text, source) = match file.filter(|file| !file.filename.is_empty()) {
            Some(file) => {
                if !is_pdf_filename(&file.filename) {
                    return Err(InputError::InvalidPdf.into());
                }
                tracing::debug!(
                    filename = %file.filename,
                    bytes = file.data.len(),
                    "Extracting uploaded PDF"
                );
                let extracted = extract_pdf_text_blocking(file.data).await?;
                (
                    extracted.text,
                    ArticleSource::Pdf {
                        pages: extracted.page_count,
                    },
                )
            }
            None => (article_text.unwrap_or_default(), ArticleSource::Text),
        };

        if text.trim().is_empty() {
            return Err(InputError::MissingText.into());
        }
        Ok((text, source))
    }
}

#[async_trait]
impl SummaryApi for SummaryService {
    fn ensure_ready(&self) -> Result<(), ProcessingError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ProcessingError::ClientUnavailable)
        }
    }

    async fn summarize(&self, input: ArticleInput) -> Result<SummaryOutcome, ProcessingError> {
        let client = self
            .client
            .as_ref()
            .ok_or(ProcessingError::ClientUnavailable)?;

        let (text, source) = self.resolve_text(input).await?;
        let article_len = text.len();
        tracing::info!(?source, article_len, "Summarizing article");

        let result = client
            .generate_summary(build_request(text, &self.language))
            .await?;

        Ok(SummaryOutcome {
            result,
            source,
            article_len,
        })
    }
}
