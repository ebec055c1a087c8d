//! PDF text extraction for uploaded articles.
//!
//! Uploads are parsed entirely in memory with `lopdf`. Each page is extracted on its own and
//! the page texts are joined with a single newline in page order, so the output for a
//! document is exactly the per-page texts stitched together.

use lopdf::Document;
use thiserror::Error;

/// Errors raised while turning an uploaded PDF into plain text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The upload contained no bytes or no extractable text.
    #[error("no text found in PDF or the file is empty")]
    Empty,
    /// The bytes could not be parsed as a PDF document.
    #[error("failed to load PDF: {0}")]
    Load(String),
    /// A page was present but its content stream could not be decoded.
    #[error("failed to extract text from page {page}: {message}")]
    Page {
        /// One-based page number reported by the document.
        page: u32,
        /// Underlying parser message.
        message: String,
    },
    /// The blocking extraction task panicked or was cancelled.
    #[error("PDF extraction task failed: {0}")]
    Task(String),
}

/// Plain text recovered from a PDF upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts joined by `"\n"` in page order.
    pub text: String,
    /// Number of pages visited.
    pub page_count: usize,
}

/// Returns `true` when the filename carries a `.pdf` extension, ignoring case.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Extract the text of every page of an in-memory PDF.
///
/// Fails with [`ExtractionError::Empty`] when the buffer is empty or the joined text is
/// whitespace only.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let document =
        Document::load_mem(bytes).map_err(|error| ExtractionError::Load(error.to_string()))?;
    let pages = page_texts(&document)?;
    let page_count = pages.len();
    let text = pages.join("\n");

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    tracing::debug!(page_count, chars = text.len(), "Extracted PDF text");
    Ok(ExtractedText { text, page_count })
}

/// Run [`extract_pdf_text`] on the blocking thread pool.
pub async fn extract_pdf_text_blocking(bytes: Vec<u8>) -> Result<ExtractedText, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|error| ExtractionError::Task(error.to_string()))?
}

fn page_texts(document: &Document) -> Result<Vec<String>, ExtractionError> {
    // BTreeMap keys keep pages in document order.
    document
        .get_pages()
        .into_keys()
        .map(|page| {
            document
                .extract_text(&[page])
                .map_err(|error| ExtractionError::Page {
                    page,
                    message: error.to_string(),
                })
        })
        .collect()
}
