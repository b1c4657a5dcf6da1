// Error types for the styling workflow

use super::types::OutfitStyle;
use thiserror::Error;

/// Result type for styling operations
pub type Result<T> = std::result::Result<T, StylistError>;

pub const GENERATE_BANNER: &str = "Failed to generate outfits. Please try again.";
pub const EDIT_BANNER: &str = "Failed to edit the outfit. Please try again.";
pub const EMPTY_PROMPT_BANNER: &str = "Edit prompt cannot be empty.";
pub const BUSY_BANNER: &str = "Please wait for the current request to finish.";
pub const NO_UPLOAD_BANNER: &str = "Upload a clothing item first.";

/// Errors raised while generating or editing outfits
#[derive(Error, Debug)]
pub enum StylistError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Failed to generate image for {style} style: {reason}")]
    Generation { style: OutfitStyle, reason: String },

    #[error("Failed to edit image: {0}")]
    Edit(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid image URL format for editing: {0}")]
    Format(String),

    #[error("Another request is still in flight")]
    Busy,

    #[error("Nothing has been uploaded yet")]
    NothingUploaded,

    #[error("No {0} outfit in the current batch")]
    UnknownOutfit(OutfitStyle),

    #[error("Result discarded because the session changed while it was in flight")]
    Discarded,
}

impl StylistError {
    /// Generic message shown to the user, if any.
    ///
    /// Discarded results belong to a state the user already left, so they
    /// never raise a banner.
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            StylistError::Decode(_) | StylistError::Generation { .. } => Some(GENERATE_BANNER),
            StylistError::Edit(_) | StylistError::Format(_) | StylistError::UnknownOutfit(_) => {
                Some(EDIT_BANNER)
            }
            StylistError::Validation(_) => Some(EMPTY_PROMPT_BANNER),
            StylistError::Busy => Some(BUSY_BANNER),
            StylistError::NothingUploaded => Some(NO_UPLOAD_BANNER),
            StylistError::Discarded => None,
        }
    }
}

/// Errors from the generation capability transport
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
