//! Request-scoped data types and error definitions for the summarization pipeline.

use crate::{extraction::ExtractionError, summarization::SummarizationClientError};
use thiserror::Error;

/// A file part received in a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename; empty when the form had no file selected.
    pub filename: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

/// Article input as received over HTTP, before resolution.
///
/// When both are present the file wins and `article_text` is ignored.
#[derive(Debug, Clone, Default)]
pub struct ArticleInput {
    /// Uploaded PDF, if the request carried a file part.
    pub file: Option<UploadedFile>,
    /// Plain `article_text` field, used verbatim.
    pub article_text: Option<String>,
}

impl ArticleInput {
    /// Text-only input.
    pub fn text(article_text: impl Into<String>) -> Self {
        Self {
            file: None,
            article_text: Some(article_text.into()),
        }
    }

    /// Upload-only input.
    pub fn file(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file: Some(UploadedFile {
                filename: filename.into(),
                data,
            }),
            article_text: None,
        }
    }
}

/// Where the summarized text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSource {
    /// Extracted from an uploaded PDF with the given page count.
    Pdf {
        /// Pages visited during extraction.
        pages: usize,
    },
    /// Submitted directly as `article_text`.
    Text,
}

/// Successful summarization of one request.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    /// Raw JSON text returned by the provider.
    pub result: String,
    /// Origin of the summarized text.
    pub source: ArticleSource,
    /// Length of the summarized text in bytes.
    pub article_len: usize,
}

/// Caller mistakes; the request can be fixed and resubmitted.
#[derive(Debug, Error)]
pub enum InputError {
    /// Neither usable text nor a usable PDF was supplied.
    #[error("No article text or valid PDF provided. Please input the content.")]
    MissingText,
    /// A file was uploaded but its name does not end in `.pdf`.
    #[error("Invalid PDF upload. Only .pdf files are accepted.")]
    InvalidPdf,
    /// The PDF was empty or contained no extractable text.
    #[error("No text found in PDF or the file is empty.")]
    EmptyPdf,
    /// The request body could not be decoded.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    /// The request body exceeded the configured upload limit.
    #[error("Upload is too large. Reduce the file size and try again.")]
    TooLarge,
}

/// Errors emitted by the summarization pipeline.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The provider client was never constructed.
    #[error("Backend Initialization Failed. Check GEMINI_API_KEY setting.")]
    ClientUnavailable,
    /// The request itself was invalid.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The provider rejected the request.
    #[error("Provider request failed: {0}")]
    Provider(#[source] SummarizationClientError),
    /// Any other failure during extraction, prompt assembly, or the provider call.
    #[error("{0}")]
    Internal(String),
}

impl From<SummarizationClientError> for ProcessingError {
    fn from(error: SummarizationClientError) -> Self {
        match error {
            SummarizationClientError::Api { .. } => Self::Provider(error),
            SummarizationClientError::MissingApiKey => Self::ClientUnavailable,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ExtractionError> for ProcessingError {
    fn from(error: ExtractionError) -> Self {
        match error {
            ExtractionError::Empty => Self::Input(InputError::EmptyPdf),
            other => Self::Internal(other.to_string()),
        }
    }
}
