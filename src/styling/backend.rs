// Generation capability boundary - what the workflow needs from an image model

use super::codec::EncodedImage;
use super::error::BackendError;
use async_trait::async_trait;

/// Output modality requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModality {
    Image,
}

impl ResponseModality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseModality::Image => "IMAGE",
        }
    }
}

/// Source image plus a natural-language instruction
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub image: EncodedImage,
    pub instruction: String,
    pub modality: ResponseModality,
}

impl ContentRequest {
    pub fn image_only(image: EncodedImage, instruction: impl Into<String>) -> Self {
        Self {
            image,
            instruction: instruction.into(),
            modality: ResponseModality::Image,
        }
    }
}

/// One piece of model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(EncodedImage),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentResponse {
    pub parts: Vec<ContentPart>,
}

impl ContentResponse {
    pub fn new(parts: Vec<ContentPart>) -> Self {
        Self { parts }
    }

    /// First image-bearing part, if the model returned one
    pub fn first_image(&self) -> Option<&EncodedImage> {
        self.parts.iter().find_map(|part| match part {
            ContentPart::Image(image) => Some(image),
            ContentPart::Text(_) => None,
        })
    }

    /// Any text the model returned alongside (or instead of) an image
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for generation backends
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send one request and return every content part of the reply
    async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse, BackendError>;

    /// Human-readable backend name for logs
    fn name(&self) -> &str;
}
