// Generation client - composes outfit prompts and runs single generate/edit calls

use super::backend::{ContentRequest, GenerationBackend};
use super::codec::EncodedImage;
use super::error::{Result, StylistError};
use super::types::{Outfit, OutfitStyle, UserProfile};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stateless wrapper over a backend; safe to call concurrently
#[derive(Clone)]
pub struct OutfitGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl OutfitGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Generate one outfit of the given style around the source item
    pub async fn generate_styled_outfit(
        &self,
        image: &EncodedImage,
        style: OutfitStyle,
        profile: &UserProfile,
    ) -> Result<Outfit> {
        let prompt = build_outfit_prompt(style, profile);
        debug!(%style, prompt_len = prompt.len(), "requesting outfit");

        let response = self
            .backend
            .generate_content(ContentRequest::image_only(image.clone(), prompt))
            .await
            .map_err(|e| StylistError::Generation {
                style,
                reason: e.to_string(),
            })?;

        let generated = response.first_image().ok_or_else(|| {
            warn!(%style, text = %response.text(), "response carried no image");
            StylistError::Generation {
                style,
                reason: "no image in response".to_string(),
            }
        })?;

        Ok(Outfit::new(style, generated.to_data_url()))
    }

    /// Apply a free-text edit to an image and return the new data URL.
    ///
    /// The instruction goes out verbatim; callers validate it first.
    pub async fn edit_image(&self, image: &EncodedImage, instruction: &str) -> Result<String> {
        let response = self
            .backend
            .generate_content(ContentRequest::image_only(image.clone(), instruction))
            .await
            .map_err(|e| StylistError::Edit(e.to_string()))?;

        response
            .first_image()
            .map(EncodedImage::to_data_url)
            .ok_or_else(|| StylistError::Edit("no image in response".to_string()))
    }
}

/// Build the generation instruction for one style
pub fn build_outfit_prompt(style: OutfitStyle, profile: &UserProfile) -> String {
    let mut prompt = format!(
        "Analyze this clothing item. Based on its style and color palette, create a complete \
         and distinct '{}' outfit that includes it. Visualize the entire outfit as a clean, \
         minimalist 'flat-lay' style image on a neutral, solid-color background. Do not include \
         any text, logos, or human models on the image. The item provided should be the central \
         piece of the outfit.",
        style
    );

    if !profile.preferred_styles.is_empty() {
        let styles: Vec<&str> = profile.preferred_styles.iter().map(|s| s.as_str()).collect();
        prompt.push_str(&format!(
            " The outfit should align with these preferred styles: {}.",
            styles.join(", ")
        ));
    }

    let colors = profile.favorite_colors.trim();
    if !colors.is_empty() {
        prompt.push_str(&format!(" Try to incorporate these favorite colors: {}.", colors));
    }

    let disliked = profile.disliked.trim();
    if !disliked.is_empty() {
        prompt.push_str(&format!(
            " Please strictly avoid these colors, patterns, or items: {}.",
            disliked
        ));
    }

    prompt
}
