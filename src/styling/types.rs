// Core types for the styling workflow

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Outfit concepts generated for every upload, in display order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutfitStyle {
    Casual,
    Business,
    Evening,
}

impl OutfitStyle {
    /// Every style, in the order outfits are generated and displayed
    pub const ALL: [OutfitStyle; 3] = [OutfitStyle::Casual, OutfitStyle::Business, OutfitStyle::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutfitStyle::Casual => "Casual",
            OutfitStyle::Business => "Business",
            OutfitStyle::Evening => "Evening",
        }
    }

    /// Case-insensitive lookup by label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for OutfitStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Style preferences a user can tick in their profile.
///
/// Declaration order is the render order; `Ord` follows it so a
/// `BTreeSet<ClothingStyle>` always iterates in that order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClothingStyle {
    Minimalist,
    Classic,
    Bohemian,
    Streetwear,
    Sporty,
    Vintage,
    Preppy,
    Edgy,
}

impl ClothingStyle {
    pub const ALL: [ClothingStyle; 8] = [
        ClothingStyle::Minimalist,
        ClothingStyle::Classic,
        ClothingStyle::Bohemian,
        ClothingStyle::Streetwear,
        ClothingStyle::Sporty,
        ClothingStyle::Vintage,
        ClothingStyle::Preppy,
        ClothingStyle::Edgy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClothingStyle::Minimalist => "Minimalist",
            ClothingStyle::Classic => "Classic",
            ClothingStyle::Bohemian => "Bohemian",
            ClothingStyle::Streetwear => "Streetwear",
            ClothingStyle::Sporty => "Sporty",
            ClothingStyle::Vintage => "Vintage",
            ClothingStyle::Preppy => "Preppy",
            ClothingStyle::Edgy => "Edgy",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for ClothingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Personal style preferences injected into generation prompts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(default)]
    pub preferred_styles: BTreeSet<ClothingStyle>,
    #[serde(default)]
    pub favorite_colors: String,
    #[serde(default)]
    pub disliked: String,
}

impl UserProfile {
    pub fn with_preferred_style(mut self, style: ClothingStyle) -> Self {
        self.preferred_styles.insert(style);
        self
    }

    pub fn with_favorite_colors(mut self, colors: impl Into<String>) -> Self {
        self.favorite_colors = colors.into();
        self
    }

    pub fn with_disliked(mut self, disliked: impl Into<String>) -> Self {
        self.disliked = disliked.into();
        self
    }

    /// True when no field would add anything to a prompt
    pub fn is_empty(&self) -> bool {
        self.preferred_styles.is_empty()
            && self.favorite_colors.trim().is_empty()
            && self.disliked.trim().is_empty()
    }
}

/// One generated image and the style it was generated for.
///
/// `image_url` is a self-describing `data:<mime>;base64,<payload>` reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outfit {
    pub style: OutfitStyle,
    pub image_url: String,
}

impl Outfit {
    pub fn new(style: OutfitStyle, image_url: impl Into<String>) -> Self {
        Self {
            style,
            image_url: image_url.into(),
        }
    }
}

/// Raw image handed over by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFile {
    /// File on disk, read lazily by the codec
    Path(PathBuf),
    /// Bytes already in memory (drag-and-drop, paste, tests)
    Bytes {
        name: String,
        media_type: Option<String>,
        data: Vec<u8>,
    },
}

impl ImageFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageFile::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        ImageFile::Bytes {
            name: name.into(),
            media_type: None,
            data,
        }
    }

    /// Short name for display and logs
    pub fn name(&self) -> String {
        match self {
            ImageFile::Path(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string(),
            ImageFile::Bytes { name, .. } => name.clone(),
        }
    }
}

/// The user's upload as held by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Opaque reference the presentation layer renders from
    pub display_url: String,
    pub source: ImageFile,
}

impl UploadedImage {
    pub fn new(source: ImageFile) -> Self {
        let display_url = match &source {
            // file:// needs an absolute path or the first segment reads as a host
            ImageFile::Path(path) => match std::path::absolute(path) {
                Ok(path) => format!("file://{}", path.display()),
                Err(_) => path.display().to_string(),
            },
            ImageFile::Bytes { name, .. } => format!("memory://{}", name),
        };

        Self { display_url, source }
    }
}
