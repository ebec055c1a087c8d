//! HTTP surface for Article Digest.
//!
//! This module exposes a compact Axum router with two endpoints:
//!
//! - `GET /` – Serve the frontend HTML page, read from disk on every request.
//! - `POST /summarize` – Summarize an article submitted as `multipart/form-data` (a PDF file
//!   part and/or an `article_text` field), as a JSON body `{"article_text": "..."}`, or as a
//!   urlencoded form. Returns `{"result": "<provider JSON text>"}`.
//!
//! Errors are always returned as `{"error": "..."}` with status 400 for caller mistakes, 413
//! for bodies over the upload limit, and 500 for configuration, provider, and internal
//! failures. Cross-origin requests are allowed
//! from any origin.

use crate::config::Config;
use crate::processing::{ArticleInput, InputError, ProcessingError, SummaryApi, UploadedFile};
use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Message returned when the provider rejects a request.
pub const PROVIDER_ERROR_MESSAGE: &str =
    "API Key Not Valid or API Request Failed. Check Terminal Log.";
/// Plain-text body returned when the frontend asset cannot be read.
pub const FRONTEND_MISSING_MESSAGE: &str = "Error: Frontend file (index.html) not found!";

const ARTICLE_TEXT_FIELD: &str = "article_text";

struct AppState<S> {
    service: Arc<S>,
    frontend_path: PathBuf,
}

/// Build the HTTP router serving the frontend and the summarization endpoint.
pub fn create_router<S>(service: Arc<S>, config: &Config) -> Router
where
    S: SummaryApi + 'static,
{
    let state = Arc::new(AppState {
        service,
        frontend_path: config.frontend_path.clone(),
    });
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(serve_frontend::<S>))
        .route("/summarize", post(summarize::<S>))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Serve the configured HTML page verbatim.
async fn serve_frontend<S>(State(state): State<Arc<AppState<S>>>) -> Response
where
    S: SummaryApi,
{
    match tokio::fs::read_to_string(&state.frontend_path).await {
        Ok(html) => ([(CACHE_CONTROL, "no-cache")], Html(html)).into_response(),
        Err(error) => {
            tracing::error!(
                path = %state.frontend_path.display(),
                %error,
                "Frontend asset unavailable"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, FRONTEND_MISSING_MESSAGE).into_response()
        }
    }
}

/// Body accepted by `POST /summarize` for JSON and urlencoded submissions.
#[derive(Deserialize)]
struct SummarizeRequest {
    #[serde(default)]
    article_text: Option<String>,
}

/// Success response for `POST /summarize`.
#[derive(Serialize)]
struct SummarizeResponse {
    /// Provider JSON text, passed through without re-parsing.
    result: String,
}

/// Summarize the submitted article.
///
/// Readiness is checked before the body is read, so a missing API key reports the
/// configuration error even for invalid input.
async fn summarize<S>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummaryApi,
{
    state.service.ensure_ready()?;
    let input = read_article_input(request).await?;
    let outcome = state.service.summarize(input).await?;
    tracing::info!(
        source = ?outcome.source,
        article_len = outcome.article_len,
        result_len = outcome.result.len(),
        "Summarize request completed"
    );
    Ok(Json(SummarizeResponse {
        result: outcome.result,
    }))
}

async fn read_article_input(request: Request) -> Result<ArticleInput, InputError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(body) = Form::<SummarizeRequest>::from_request(request, &())
            .await
            .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;
        Ok(ArticleInput {
            file: None,
            article_text: body.article_text,
        })
    } else {
        let Json(body) = Json::<SummarizeRequest>::from_request(request, &())
            .await
            .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;
        Ok(ArticleInput {
            file: None,
            article_text: body.article_text,
        })
    }
}

/// Collect the first named file part and the `article_text` field; other parts are drained.
async fn read_multipart(mut multipart: Multipart) -> Result<ArticleInput, InputError> {
    let mut input = ArticleInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| body_error(error.status(), error.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let filename = field.file_name().map(str::to_string);

        if let Some(filename) = filename {
            let data = field
                .bytes()
                .await
                .map_err(|error| body_error(error.status(), error.body_text()))?
                .to_vec();
            let keep_existing = input
                .file
                .as_ref()
                .is_some_and(|file| !file.filename.is_empty());
            if !keep_existing {
                input.file = Some(UploadedFile { filename, data });
            }
        } else if name == ARTICLE_TEXT_FIELD {
            let text = field
                .text()
                .await
                .map_err(|error| body_error(error.status(), error.body_text()))?;
            input.article_text = Some(text);
        } else {
            field
                .bytes()
                .await
                .map_err(|error| body_error(error.status(), error.body_text()))?;
        }
    }

    Ok(input)
}

/// Map an extractor failure onto an input error, keeping the body-limit case distinct.
fn body_error(status: StatusCode, detail: String) -> InputError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        InputError::TooLarge
    } else {
        InputError::MalformedBody(detail)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

struct AppError(ProcessingError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ProcessingError::ClientUnavailable => {
                tracing::warn!("Rejecting request: Gemini client not initialized");
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
            ProcessingError::Input(InputError::TooLarge) => {
                tracing::warn!("Rejecting request body over the upload limit");
                (StatusCode::PAYLOAD_TOO_LARGE, InputError::TooLarge.to_string())
            }
            ProcessingError::Input(error) => {
                tracing::debug!(%error, "Rejecting invalid input");
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            ProcessingError::Provider(error) => {
                tracing::error!(%error, "Gemini API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    PROVIDER_ERROR_MESSAGE.to_string(),
                )
            }
            ProcessingError::Internal(message) => {
                tracing::error!(error = %message, "Summarization failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal Server Error: {message}"),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self(inner)
    }
}

impl From<InputError> for AppError {
    fn from(inner: InputError) -> Self {
        Self(ProcessingError::Input(inner))
    }
}
