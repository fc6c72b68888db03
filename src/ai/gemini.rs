use super::{Completion, CompletionGateway, GatewayError, GatewayResult, is_credential_signature};
use crate::attachment::InlineData;
use crate::config::Config;
use crate::credentials::CredentialSlot;
use crate::types::CitationSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Gateway backed by Gemini's `generateContent` endpoint. Each capability
/// maps to a configured model; search grounding adds the Google Search tool.
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    credentials: CredentialSlot,
    standard_model: String,
    search_model: String,
    fast_model: String,
}

impl GeminiGateway {
    pub fn new(config: &Config, credentials: CredentialSlot) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            standard_model: config.standard_model.clone(),
            search_model: config.search_model.clone(),
            fast_model: config.fast_model.clone(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, body: &GenerateRequest) -> GatewayResult<Completion> {
        let Some(api_key) = self.credentials.get() else {
            return Err(GatewayError::missing_credential("No API key configured"));
        };

        tracing::debug!(model, grounded = body.tools.is_some(), "sending generateContent");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::network(format!("Request timeout: {}", e))
                } else if e.is_connect() {
                    GatewayError::network(format!("Connection failed: {}", e))
                } else {
                    GatewayError::from_message(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let err = classify_failure(status, &body);
            tracing::warn!(%status, kind = ?err.kind, "generateContent failed");
            return Err(err);
        }

        parse_response(&body)
    }
}

#[async_trait]
impl CompletionGateway for GeminiGateway {
    async fn complete_multimodal(
        &self,
        prompt: &str,
        attachment: Option<InlineData>,
    ) -> GatewayResult<Completion> {
        let body = build_request(prompt, attachment, false);
        self.generate(&self.standard_model, &body).await
    }

    async fn complete_search_grounded(&self, prompt: &str) -> GatewayResult<Completion> {
        let body = build_request(prompt, None, true);
        self.generate(&self.search_model, &body).await
    }

    async fn complete_lite(&self, prompt: &str) -> GatewayResult<Completion> {
        let body = build_request(prompt, None, false);
        self.generate(&self.fast_model, &body).await
    }
}

fn build_request(prompt: &str, attachment: Option<InlineData>, grounded: bool) -> GenerateRequest {
    let mut parts = Vec::with_capacity(2);
    if !prompt.trim().is_empty() {
        parts.push(Part::Text {
            text: prompt.to_string(),
        });
    }
    if let Some(inline_data) = attachment {
        parts.push(Part::InlineData { inline_data });
    }

    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        tools: grounded.then(|| {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        }),
    }
}

fn parse_response(body: &str) -> GatewayResult<Completion> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::malformed(format!("Failed to parse response: {}", e)))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GatewayError::invalid_request(format!(
                "Prompt blocked: {}",
                reason
            )));
        }
        return Err(GatewayError::malformed("No candidates in response"));
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|meta| {
            meta.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| Some(CitationSource::new(web.uri?, web.title)))
                .collect()
        })
        .unwrap_or_default();

    Ok(Completion { text, sources })
}

fn classify_failure(status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if is_credential_signature(&message) {
        return GatewayError::credential_not_recognized(format!("[{}] {}", status, message));
    }

    let message = format!("[{}] {}", status, message);
    match status.as_u16() {
        400 => GatewayError::invalid_request(message),
        401 | 403 => GatewayError::auth(message),
        429 => GatewayError::rate_limit(message),
        500..=599 => GatewayError::server_error(message),
        _ => GatewayError::unknown(message),
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GatewayErrorKind;
    use serde_json::json;

    #[test]
    fn test_builds_multimodal_request() {
        let body = build_request(
            "Describe this",
            Some(InlineData {
                mime_type: "image/png".to_string(),
                data: "iVBORw0KGgo=".to_string(),
            }),
            false,
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Describe this" },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_builds_grounded_request() {
        let body = build_request("weather today", None, true);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "weather today" }] }],
                "tools": [{ "googleSearch": {} }]
            })
        );
    }

    #[test]
    fn test_image_only_prompt_has_no_text_part() {
        let body = build_request(
            "  ",
            Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "AAAA".to_string(),
            }),
            false,
        );
        assert_eq!(body.contents[0].parts.len(), 1);
    }

    #[test]
    fn test_parses_text_and_sources() {
        let body = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "Sunny, " },
                    { "text": "22°C." }
                ]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://weather.example.com/a", "title": "example.com" } },
                        { "web": { "uri": "https://news.example.org/b" } },
                        { "retrievedContext": {} },
                        { "web": { "title": "no uri" } }
                    ]
                }
            }],
            "usageMetadata": { "promptTokenCount": 4 }
        })
        .to_string();

        let completion = parse_response(&body).unwrap();
        assert_eq!(completion.text, "Sunny, 22°C.");
        assert_eq!(
            completion.sources,
            vec![
                CitationSource::new("https://weather.example.com/a", Some("example.com".to_string())),
                CitationSource::new("https://news.example.org/b", None),
            ]
        );
    }

    #[test]
    fn test_parses_response_without_grounding() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion, Completion::text("hi"));
    }

    #[test]
    fn test_empty_candidates_are_errors() {
        let blocked = parse_response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap_err();
        assert_eq!(blocked.kind, GatewayErrorKind::InvalidRequest);
        assert!(blocked.message.contains("SAFETY"));

        let empty = parse_response(r#"{"candidates":[]}"#).unwrap_err();
        assert_eq!(empty.kind, GatewayErrorKind::MalformedResponse);

        let garbage = parse_response("<html>").unwrap_err();
        assert_eq!(garbage.kind, GatewayErrorKind::MalformedResponse);
    }

    #[test]
    fn test_classifies_failures() {
        let not_found = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        let err = classify_failure(StatusCode::NOT_FOUND, not_found);
        assert!(err.is_credential_issue());
        assert!(err.message.contains("Requested entity was not found."));

        let quota = r#"{"error":{"code":429,"message":"Resource exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, quota).kind,
            GatewayErrorKind::RateLimit
        );
        assert_eq!(
            classify_failure(StatusCode::FORBIDDEN, "denied").kind,
            GatewayErrorKind::Auth
        );
        let server = classify_failure(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(server.kind, GatewayErrorKind::ServerError);
        assert_eq!(server.message, "[502 Bad Gateway] upstream down");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let config = Config {
            base_url: "http://127.0.0.1:9/v1beta".to_string(),
            ..Config::default()
        };
        let gateway = GeminiGateway::new(&config, CredentialSlot::default());
        let err = gateway.complete_lite("hi").await.unwrap_err();
        assert!(err.is_credential_issue());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = Config {
            base_url: "https://example.test/v1beta/".to_string(),
            ..Config::default()
        };
        let gateway = GeminiGateway::new(&config, CredentialSlot::default());
        assert_eq!(
            gateway.endpoint("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
