//! HTTP client for Gemini-style `generateContent` endpoints

use crate::{ExternalServiceError, GenerativeModel, StructuredPrompt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Default API host
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model name
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Model API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key; never logged
    pub api_key: Option<String>,
    /// Per-request timeout (ms). None waits indefinitely.
    pub timeout_ms: Option<u64>,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_ms: None,
        }
    }
}

impl GenAiConfig {
    /// Whether a non-empty API key is present
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl fmt::Debug for GenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_request(prompt: &StructuredPrompt) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![RequestPart { text: &prompt.text }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &prompt.response_schema,
        },
    }
}

/// Pull the JSON answer out of the first candidate
fn extract_json(response: GenerateContentResponse) -> Result<Value, ExternalServiceError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        return Err(ExternalServiceError::EmptyResponse);
    }

    serde_json::from_str(text).map_err(|e| ExternalServiceError::SchemaViolation(e.to_string()))
}

/// Models occasionally wrap JSON in a markdown fence even in JSON mode
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Generative model reached over HTTPS
pub struct HttpModel {
    config: GenAiConfig,
    api_key: String,
    client: reqwest::Client,
}

impl HttpModel {
    /// Build a client; fails when no API key is configured
    pub fn new(config: GenAiConfig) -> Result<Self, ExternalServiceError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ExternalServiceError::MissingApiKey)?;

        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build()?;

        info!("Creating HTTP model client: {:?}", config);
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Model name in use
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl GenerativeModel for HttpModel {
    async fn generate(&self, prompt: &StructuredPrompt) -> Result<Value, ExternalServiceError> {
        let url = self.config.endpoint();
        debug!(prompt = prompt.name, %url, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ExternalServiceError::SchemaViolation(e.to_string()))?;

        extract_json(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single HTTP response; the handle yields the raw request
    async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&received) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).into_owned()
        });

        (base_url, handle)
    }

    fn request_complete(data: &[u8]) -> bool {
        let text = String::from_utf8_lossy(data);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        data.len() >= end + 4 + content_length
    }

    fn local_model(base_url: String) -> HttpModel {
        HttpModel::new(GenAiConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            timeout_ms: Some(5000),
            ..Default::default()
        })
        .unwrap()
    }

    fn alert_prompt() -> StructuredPrompt {
        StructuredPrompt::new("alert", "Speed: 90 km/h", json!({"type": "OBJECT"}))
    }

    #[test]
    fn test_request_body_shape() {
        let prompt = StructuredPrompt::new("p", "Speed: 60 km/h", json!({"type": "OBJECT"}));
        let body = serde_json::to_value(build_request(&prompt)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Speed: 60 km/h");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_extract_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"alertLevel\": \"LOW\"}"}]}},
                {"content": {"parts": [{"text": "{\"alertLevel\": \"HIGH\"}"}]}}
            ]
        }))
        .unwrap();

        assert_eq!(extract_json(response).unwrap(), json!({"alertLevel": "LOW"}));
    }

    #[test]
    fn test_extract_joins_parts_and_strips_fence() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "```json\n{\"summary\": "},
                {"text": "\"clear\"}\n```"}
            ]}}]
        }))
        .unwrap();

        assert_eq!(extract_json(response).unwrap(), json!({"summary": "clear"}));
    }

    #[test]
    fn test_extract_empty() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(matches!(extract_json(response), Err(ExternalServiceError::EmptyResponse)));

        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert!(matches!(extract_json(response), Err(ExternalServiceError::EmptyResponse)));
    }

    #[test]
    fn test_extract_non_json_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Alert level: HIGH"}]}}]
        }))
        .unwrap();
        assert!(matches!(
            extract_json(response),
            Err(ExternalServiceError::SchemaViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_decodes_candidate() {
        let body = json!({
            "candidates": [{"content": {"parts": [
                {"text": "{\"alertDistanceMeters\": 250, \"alertLevel\": \"HIGH\"}"}
            ]}}]
        })
        .to_string();
        let (base_url, server) = serve_once("200 OK", body).await;

        let value = local_model(base_url).generate(&alert_prompt()).await.unwrap();
        assert_eq!(value, json!({"alertDistanceMeters": 250, "alertLevel": "HIGH"}));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains("\"responseMimeType\":\"application/json\""));
        assert!(request.contains("Speed: 90 km/h"));
    }

    #[tokio::test]
    async fn test_generate_maps_error_status() {
        let (base_url, server) =
            serve_once("503 Service Unavailable", "model overloaded".to_string()).await;

        let err = local_model(base_url).generate(&alert_prompt()).await.unwrap_err();
        match err {
            ExternalServiceError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model overloaded");
            }
            other => panic!("expected status error, got {other:?}"),
        }

        let request = server.await.unwrap();
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_body() {
        let (base_url, server) = serve_once("200 OK", "not json".to_string()).await;

        let err = local_model(base_url).generate(&alert_prompt()).await.unwrap_err();
        assert!(matches!(err, ExternalServiceError::SchemaViolation(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = local_model(base_url).generate(&alert_prompt()).await.unwrap_err();
        assert!(matches!(err, ExternalServiceError::Transport(_)));
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            HttpModel::new(GenAiConfig::default()),
            Err(ExternalServiceError::MissingApiKey)
        ));

        let blank = GenAiConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!blank.has_api_key());
        assert!(HttpModel::new(blank).is_err());
    }

    #[test]
    fn test_endpoint_and_redaction() {
        let config = GenAiConfig {
            base_url: "http://localhost:9000/".to_string(),
            api_key: Some("secret-key".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(!format!("{:?}", config).contains("secret-key"));

        let model = HttpModel::new(config).unwrap();
        assert_eq!(model.model(), "gemini-2.5-flash");
    }
}
