use super::{SummarizationClient, SummarizationClientError, SummarizationRequest};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client with schema-constrained JSON output.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client for the given key, model, and API base URL.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent("article-digest/summary")
            .build()
            .map_err(|error| SummarizationClientError::Transport(error.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build a client from configuration, failing when no API key was supplied.
    pub fn from_config(config: &Config) -> Result<Self, SummarizationClientError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(SummarizationClientError::MissingApiKey)?;
        Self::new(api_key, &config.gemini_model, &config.gemini_base_url)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Result<String, SummarizationClientError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(SummarizationClientError::InvalidResponse(reason));
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(SummarizationClientError::InvalidResponse(
                "candidate contained no text".into(),
            ));
        }
        Ok(text)
    }
}

fn describe_api_error(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{status}: {}", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl SummarizationClient for GeminiClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let payload = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part {
                        text: &request.prompt,
                    },
                    Part {
                        text: &request.article,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.schema,
            },
        };

        tracing::debug!(
            model = %self.model,
            article_chars = request.article.len(),
            "Requesting Gemini summary"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::Transport(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::Api {
                status: status.as_u16(),
                message: describe_api_error(&body),
            });
        }

        let body: GenerateContentResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Gemini response: {error}"
            ))
        })?;

        body.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarization::prompt::build_request;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", "gemini-2.5-flash", server.base_url()).expect("client")
    }

    #[tokio::test]
    async fn gemini_client_returns_candidate_text() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header(API_KEY_HEADER, "test-key")
                    .json_body_partial(
                        json!({
                            "generationConfig": { "responseMimeType": "application/json" }
                        })
                        .to_string(),
                    );
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": "{\"summary\":" }, { "text": "\"ok\"}" }]
                        },
                        "finishReason": "STOP"
                    }]
                }));
            })
            .await;

        let text = client
            .generate_summary(build_request("Article body".into(), "English"))
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(text, "{\"summary\":\"ok\"}");
    }

    #[tokio::test]
    async fn gemini_client_sends_schema_and_article() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .body_contains("The article")
                    .body_contains(r#""required":["summary","keywords","faqs"]"#)
                    .body_contains("You are a professional article summarizer.");
                then.status(200).json_body(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
                }));
            })
            .await;

        client
            .generate_summary(build_request("The article".into(), "Thai"))
            .await
            .expect("summary");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gemini_client_maps_error_status_to_api_error() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(400).json_body(json!({
                    "error": {
                        "code": 400,
                        "message": "API key not valid. Please pass a valid API key.",
                        "status": "INVALID_ARGUMENT"
                    }
                }));
            })
            .await;

        let error = client
            .generate_summary(build_request("Article".into(), "Thai"))
            .await
            .expect_err("api error");

        match error {
            SummarizationClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("INVALID_ARGUMENT"));
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn gemini_client_rejects_blocked_prompt() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({
                    "promptFeedback": { "blockReason": "SAFETY" }
                }));
            })
            .await;

        let error = client
            .generate_summary(build_request("Article".into(), "Thai"))
            .await
            .expect_err("blocked");
        assert!(
            matches!(error, SummarizationClientError::InvalidResponse(reason) if reason == "SAFETY")
        );
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let client =
            GeminiClient::new("key", "gemini-2.5-flash", "http://127.0.0.1:1").expect("client");
        let error = client
            .generate_summary(build_request("Article".into(), "Thai"))
            .await
            .expect_err("unreachable");
        assert!(matches!(error, SummarizationClientError::Transport(_)));
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = Config::default();
        let error = GeminiClient::from_config(&config)
            .err()
            .expect("missing key");
        assert!(matches!(error, SummarizationClientError::MissingApiKey));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let client =
            GeminiClient::new("key", "gemini-2.5-flash", "https://example.test/").expect("client");
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
