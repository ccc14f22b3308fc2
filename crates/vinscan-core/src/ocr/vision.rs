//! Google Cloud Vision text detection client.

use std::time::Duration;

use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextDetector;

/// Blocking client for the Vision `images:annotate` endpoint.
pub struct VisionClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnnotateResponse {
    responses: Vec<ImageResponse>,
    error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ImageResponse {
    text_annotations: Vec<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Status {
    message: String,
}

impl VisionClient {
    /// Create a client for an endpoint and API key.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from configuration, reading the key from the environment.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                OcrError::Unavailable(format!("{} is not set", config.api_key_env))
            })?;

        Self::new(
            config.endpoint.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl TextDetector for VisionClient {
    fn detect_text(&self, image: &[u8]) -> Result<String, OcrError> {
        info!("Sending {} bytes to text detection", image.len());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&build_request(image))
            .send()
            .map_err(|e| OcrError::Detection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<AnnotateResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(OcrError::Detection(format!("{}: {}", status, message)));
        }

        let parsed: AnnotateResponse = response
            .json()
            .map_err(|e| OcrError::Detection(format!("invalid response: {}", e)))?;

        let text = parse_response(parsed)?;
        debug!("Detected {} characters", text.len());
        Ok(text)
    }
}

fn build_request(image: &[u8]) -> AnnotateRequest {
    AnnotateRequest {
        requests: vec![ImageRequest {
            image: ImageContent {
                content: base64::engine::general_purpose::STANDARD.encode(image),
            },
            features: vec![Feature {
                kind: "TEXT_DETECTION",
            }],
        }],
    }
}

/// The first text annotation holds the whole page text.
fn parse_response(response: AnnotateResponse) -> Result<String, OcrError> {
    if let Some(error) = response.error.filter(|e| !e.message.is_empty()) {
        return Err(OcrError::Detection(error.message));
    }

    let Some(first) = response.responses.into_iter().next() else {
        return Ok(String::new());
    };

    if let Some(error) = first.error.filter(|e| !e.message.is_empty()) {
        return Err(OcrError::Detection(error.message));
    }

    Ok(first
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canned_http::{refused_base, CannedServer};

    fn parse(json: &str) -> Result<String, OcrError> {
        parse_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(build_request(b"abc")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "requests": [{
                    "image": {"content": "YWJj"},
                    "features": [{"type": "TEXT_DETECTION"}]
                }]
            })
        );
    }

    #[test]
    fn test_first_annotation_is_full_text() {
        let text = parse(
            r#"{"responses": [{"textAnnotations": [
                {"locale": "fr", "description": "FACTURE EN COMPTE\nN° 00123"},
                {"description": "FACTURE"}
            ]}]}"#,
        )
        .unwrap();

        assert_eq!(text, "FACTURE EN COMPTE\nN° 00123");
    }

    #[test]
    fn test_no_text_is_empty() {
        assert_eq!(parse(r#"{"responses": [{}]}"#).unwrap(), "");
        assert_eq!(parse(r#"{}"#).unwrap(), "");
    }

    #[test]
    fn test_error_message_is_surfaced() {
        let err = parse(r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#)
            .unwrap_err();

        assert!(matches!(err, OcrError::Detection(ref m) if m == "Bad image data."));
    }

    fn client(base: &str) -> VisionClient {
        VisionClient::new(
            format!("{}/v1/images:annotate", base),
            "secret",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_detect_text_over_http() {
        let server = CannedServer::start(vec![(
            200,
            r#"{"responses": [{"textAnnotations": [{"description": "DOIT : S2M"}]}]}"#,
        )]);

        assert_eq!(client(server.base()).detect_text(b"abc").unwrap(), "DOIT : S2M");

        let request = &server.requests()[0];
        assert!(request.starts_with("POST /v1/images:annotate?key=secret"));
        assert!(request.contains(r#""content":"YWJj""#));
    }

    #[test]
    fn test_http_error_body_is_surfaced() {
        let server = CannedServer::start(vec![(
            400,
            r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}}"#,
        )]);

        let err = client(server.base()).detect_text(b"abc").unwrap_err();
        server.requests();

        match err {
            OcrError::Detection(message) => {
                assert!(message.starts_with("400"));
                assert!(message.ends_with("API key not valid. Please pass a valid API key."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_detection_error() {
        let err = client(&refused_base()).detect_text(b"abc").unwrap_err();
        assert!(matches!(err, OcrError::Detection(_)));
    }
}
