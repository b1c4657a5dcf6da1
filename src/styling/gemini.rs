//! Gemini `generateContent` backend.
//!
//! Sends the source image inline with the instruction and asks for image-only
//! output. No retries and no request timeout: a hung call stays hung.

use super::backend::{ContentPart, ContentRequest, ContentResponse, GenerationBackend};
use super::codec::EncodedImage;
use super::error::BackendError;
use crate::config::GeminiConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Image generation through the Gemini REST API
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig, api_key: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse, BackendError> {
        let body = GeminiRequest::from_request(&request);
        let url = self.url();

        debug!(
            model = %self.config.model,
            media_type = %request.image.media_type,
            payload_len = request.image.data.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(BackendError::Http(format!("HTTP {}: {}", status, text)));
        }

        parse_response(&text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Turn a raw `generateContent` body into content parts
pub fn parse_response(body: &str) -> Result<ContentResponse, BackendError> {
    let parsed: GeminiResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(BackendError::Api(error.message));
    }

    let parts = parsed
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| match (part.inline_data, part.text) {
            (Some(inline), _) => Some(ContentPart::Image(EncodedImage::new(inline.mime_type, inline.data))),
            (None, Some(text)) => Some(ContentPart::Text(text)),
            (None, None) => None,
        })
        .collect();

    Ok(ContentResponse::new(parts))
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

impl GeminiRequest {
    fn from_request(request: &ContentRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart {
                        inline_data: Some(InlineData {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        }),
                        text: None,
                    },
                    GeminiPart {
                        inline_data: None,
                        text: Some(request.instruction.clone()),
                    },
                ],
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec![request.modality.as_str().to_string()],
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
