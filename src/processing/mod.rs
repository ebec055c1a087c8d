//! Summarization pipeline: input resolution, PDF extraction, and the provider call.

pub(crate) mod service;
pub mod types;

pub use service::{SummaryApi, SummaryService};
pub use types::{
    ArticleInput, ArticleSource, InputError, ProcessingError, SummaryOutcome, UploadedFile,
};
