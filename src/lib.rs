#![deny(missing_docs)]

//! Core library for the Article Digest summarization server.

/// HTTP routing and request handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// PDF text extraction for uploaded articles.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Article summarization pipeline.
pub mod processing;
/// Summarization provider clients, prompt, and response schema.
pub mod summarization;
