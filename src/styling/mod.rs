// Styling workflow - turns one clothing photo into a set of editable outfits

pub mod backend;
pub mod codec;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod profile;
pub mod stylist;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{ContentPart, ContentRequest, ContentResponse, GenerationBackend, ResponseModality};
pub use codec::EncodedImage;
pub use error::{BackendError, Result, StylistError};
pub use gemini::GeminiBackend;
pub use generator::{OutfitGenerator, build_outfit_prompt};
pub use profile::ProfileStore;
pub use stylist::Stylist;
pub use types::*;
pub use workflow::{Phase, WorkflowState};
