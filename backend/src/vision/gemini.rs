use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{ImageInput, VisionError, VisionModel};
use crate::config::VisionConfig;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, VisionError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = self.prompt_feedback.and_then(|f| f.block_reason);
            return Err(VisionError::EmptyResponse(reason));
        }
        Ok(text)
    }
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    endpoint: Url,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &VisionConfig) -> Result<Self, VisionError> {
        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        ))?;
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(&self, prompt: &str, image: &ImageInput) -> Result<String, VisionError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: STANDARD.encode(&image.bytes),
                        },
                    },
                ],
            }],
        };

        log::debug!("Sending generateContent request to {}", self.endpoint);
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Gemini request failed with {}: {}", status, body);
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<GenerateContentResponse>().await?.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> GeminiClient {
        GeminiClient::new(&VisionConfig {
            api_key: "test-key".into(),
            base_url: server.url(),
            ..VisionConfig::default()
        })
        .unwrap()
    }

    fn image() -> ImageInput {
        ImageInput {
            bytes: b"abc".to_vec(),
            mime_type: "image/png".into(),
            width: 1,
            height: 1,
        }
    }

    #[actix_web::test]
    async fn sends_prompt_and_inline_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{
                    "parts": [
                        {"text": "Who is this?"},
                        {"inline_data": {"mime_type": "image/png", "data": "YWJj"}}
                    ]
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "Stephen "}, {"text": "Curry\n"}]}
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = client_for(&server)
            .generate("Who is this?", &image())
            .await
            .unwrap();
        assert_eq!(text, "Stephen Curry\n");
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn surfaces_api_errors_with_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let err = client_for(&server)
            .generate("prompt", &image())
            .await
            .unwrap_err();
        match err {
            VisionError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn blocked_prompt_is_an_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}).to_string())
            .create_async()
            .await;

        let err = client_for(&server)
            .generate("prompt", &image())
            .await
            .unwrap_err();
        assert!(matches!(err, VisionError::EmptyResponse(Some(ref r)) if r == "SAFETY"));
    }
}
