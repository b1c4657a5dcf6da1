// Workflow state - upload, generate, display, edit, reset as pure transitions
//
// Every async result comes back with the ticket it was started under. A ticket
// from an older session is ignored, so a reset can never be undone by a late
// response.

use super::codec::EncodedImage;
use super::error::{Result, StylistError};
use super::types::{ImageFile, Outfit, OutfitStyle, UploadedImage};
use tracing::{info, warn};

/// Where the workflow is, derived from the state fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Analyzing,
    Displaying,
    Editing(OutfitStyle),
}

/// Issued when a generation batch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    pub session: u64,
}

/// Issued when an edit starts; carries everything the edit call needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTicket {
    pub session: u64,
    pub style: OutfitStyle,
    pub image: EncodedImage,
    pub instruction: String,
}

/// The single piece of mutable state the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    session: u64,
    upload: Option<UploadedImage>,
    outfits: Vec<Outfit>,
    generating: bool,
    editing: Option<OutfitStyle>,
    error: Option<String>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (&self.upload, self.generating, self.editing) {
            (None, _, _) => Phase::Idle,
            (Some(_), true, _) => Phase::Analyzing,
            (Some(_), false, Some(style)) => Phase::Editing(style),
            (Some(_), false, None) => Phase::Displaying,
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn upload(&self) -> Option<&UploadedImage> {
        self.upload.as_ref()
    }

    /// Current batch, always in `OutfitStyle::ALL` order
    pub fn outfits(&self) -> &[Outfit] {
        &self.outfits
    }

    pub fn outfit(&self, style: OutfitStyle) -> Option<&Outfit> {
        self.outfits.iter().find(|outfit| outfit.style == style)
    }

    /// Banner text, if one is raised
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn editing(&self) -> Option<OutfitStyle> {
        self.editing
    }

    /// True while any request is in flight; edit controls are disabled
    pub fn is_busy(&self) -> bool {
        self.generating || self.editing.is_some()
    }

    fn raise(&mut self, err: &StylistError) {
        if let Some(banner) = err.banner() {
            self.error = Some(banner.to_string());
        }
    }

    /// New upload: forget the previous batch and start a new session
    pub fn begin_upload(&mut self, file: ImageFile) -> GenerationTicket {
        self.session += 1;
        info!(session = self.session, file = %file.name(), "upload received");

        self.upload = Some(UploadedImage::new(file));
        self.outfits.clear();
        self.generating = true;
        self.editing = None;
        self.error = None;

        GenerationTicket {
            session: self.session,
        }
    }

    /// Re-run generation for the image already uploaded
    pub fn begin_regenerate(&mut self) -> Result<(GenerationTicket, ImageFile)> {
        if self.is_busy() {
            return Err(StylistError::Busy);
        }
        let file = self
            .upload
            .as_ref()
            .map(|upload| upload.source.clone())
            .ok_or(StylistError::NothingUploaded)?;

        Ok((self.begin_upload(file.clone()), file))
    }

    /// Settle a generation batch. All or nothing: an error leaves no outfits.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<Vec<Outfit>>,
    ) -> Result<Vec<Outfit>> {
        if ticket.session != self.session {
            warn!(
                ticket = ticket.session,
                current = self.session,
                "discarding generation result from a stale session"
            );
            return Err(StylistError::Discarded);
        }

        self.generating = false;
        match result {
            Ok(batch) => {
                info!(session = self.session, outfits = batch.len(), "outfits ready");
                self.outfits = batch.clone();
                Ok(batch)
            }
            Err(err) => {
                warn!(session = self.session, error = %err, "outfit generation failed");
                self.outfits.clear();
                self.raise(&err);
                Err(err)
            }
        }
    }

    /// Validate an edit and mark its outfit busy.
    ///
    /// Rejections happen here, before any network call.
    pub fn begin_edit(&mut self, style: OutfitStyle, instruction: &str) -> Result<EditTicket> {
        if instruction.trim().is_empty() {
            let err = StylistError::Validation("edit prompt is empty".to_string());
            self.raise(&err);
            return Err(err);
        }
        if self.is_busy() {
            return Err(StylistError::Busy);
        }

        let image = match self.outfit(style) {
            Some(outfit) => EncodedImage::from_data_url(&outfit.image_url),
            None => Err(StylistError::UnknownOutfit(style)),
        };
        let image = match image {
            Ok(image) => image,
            Err(err) => {
                warn!(%style, error = %err, "edit rejected");
                self.raise(&err);
                return Err(err);
            }
        };

        info!(session = self.session, %style, "edit started");
        self.editing = Some(style);
        self.error = None;

        Ok(EditTicket {
            session: self.session,
            style,
            image,
            instruction: instruction.to_string(),
        })
    }

    /// Settle an edit. Success swaps in a new outfit for that style only.
    pub fn finish_edit(&mut self, ticket: EditTicket, result: Result<String>) -> Result<Outfit> {
        if ticket.session != self.session {
            warn!(
                ticket = ticket.session,
                current = self.session,
                style = %ticket.style,
                "discarding edit result from a stale session"
            );
            return Err(StylistError::Discarded);
        }

        if self.editing == Some(ticket.style) {
            self.editing = None;
        }

        match result {
            Ok(image_url) => {
                let slot = self
                    .outfits
                    .iter_mut()
                    .find(|outfit| outfit.style == ticket.style)
                    .ok_or(StylistError::Discarded)?;
                let updated = Outfit::new(ticket.style, image_url);
                *slot = updated.clone();
                info!(session = self.session, style = %ticket.style, "edit applied");
                Ok(updated)
            }
            Err(err) => {
                warn!(style = %ticket.style, error = %err, "edit failed");
                self.raise(&err);
                Err(err)
            }
        }
    }

    /// Back to idle from anywhere; in-flight results become stale
    pub fn reset(&mut self) {
        self.session += 1;
        info!(session = self.session, "workflow reset");

        self.upload = None;
        self.outfits.clear();
        self.generating = false;
        self.editing = None;
        self.error = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::error::{EDIT_BANNER, EMPTY_PROMPT_BANNER, GENERATE_BANNER};

    fn batch() -> Vec<Outfit> {
        OutfitStyle::ALL
            .iter()
            .map(|style| {
                Outfit::new(
                    *style,
                    EncodedImage::new("image/png", style.as_str()).to_data_url(),
                )
            })
            .collect()
    }

    fn displaying() -> WorkflowState {
        let mut state = WorkflowState::new();
        let ticket = state.begin_upload(ImageFile::from_path("shirt.png"));
        state.finish_generation(ticket, Ok(batch())).unwrap();
        state
    }

    #[test]
    fn test_phases() {
        let mut state = WorkflowState::new();
        assert_eq!(state.phase(), Phase::Idle);

        let ticket = state.begin_upload(ImageFile::from_path("shirt.png"));
        assert_eq!(state.phase(), Phase::Analyzing);
        assert!(state.is_busy());

        state.finish_generation(ticket, Ok(batch())).unwrap();
        assert_eq!(state.phase(), Phase::Displaying);

        state.begin_edit(OutfitStyle::Evening, "add gold earrings").unwrap();
        assert_eq!(state.phase(), Phase::Editing(OutfitStyle::Evening));

        state.reset();
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_upload_clears_previous_batch_and_error() {
        let mut state = displaying();
        state.error = Some(EDIT_BANNER.to_string());

        state.begin_upload(ImageFile::from_path("skirt.png"));
        assert!(state.outfits().is_empty());
        assert!(state.error().is_none());
        assert_eq!(state.upload().unwrap().source.name(), "skirt.png");
    }

    #[test]
    fn test_failed_generation_keeps_upload_and_shows_nothing() {
        let mut state = WorkflowState::new();
        let ticket = state.begin_upload(ImageFile::from_path("shirt.png"));

        let err = StylistError::Generation {
            style: OutfitStyle::Business,
            reason: "boom".into(),
        };
        assert!(state.finish_generation(ticket, Err(err)).is_err());

        assert!(state.outfits().is_empty());
        assert_eq!(state.error(), Some(GENERATE_BANNER));
        assert!(state.upload().is_some());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_stale_generation_is_ignored_after_reset() {
        let mut state = WorkflowState::new();
        let ticket = state.begin_upload(ImageFile::from_path("shirt.png"));
        state.reset();

        let result = state.finish_generation(ticket, Ok(batch()));
        assert!(matches!(result, Err(StylistError::Discarded)));
        assert!(state.outfits().is_empty());
        assert!(state.upload().is_none());
        assert_eq!(
            state,
            WorkflowState {
                session: state.session,
                ..WorkflowState::default()
            }
        );
    }

    #[test]
    fn test_second_upload_supersedes_first() {
        let mut state = WorkflowState::new();
        let first = state.begin_upload(ImageFile::from_path("one.png"));
        let second = state.begin_upload(ImageFile::from_path("two.png"));

        assert!(state.finish_generation(first, Ok(batch())).is_err());
        assert!(state.outfits().is_empty());
        assert!(state.finish_generation(second, Ok(batch())).is_ok());
        assert_eq!(state.outfits().len(), 3);
    }

    #[test]
    fn test_empty_instruction_is_rejected() {
        let mut state = displaying();
        for instruction in ["", "   ", "\n\t"] {
            let err = state.begin_edit(OutfitStyle::Casual, instruction).unwrap_err();
            assert!(matches!(err, StylistError::Validation(_)));
        }
        assert_eq!(state.error(), Some(EMPTY_PROMPT_BANNER));
        assert_eq!(state.editing(), None);
    }

    #[test]
    fn test_single_busy_flag_blocks_second_edit() {
        let mut state = displaying();
        state.begin_edit(OutfitStyle::Casual, "make it denim").unwrap();

        let err = state.begin_edit(OutfitStyle::Business, "add a tie").unwrap_err();
        assert!(matches!(err, StylistError::Busy));
        assert_eq!(state.editing(), Some(OutfitStyle::Casual));
    }

    #[test]
    fn test_edit_on_malformed_reference_fails_early() {
        let mut state = displaying();
        state.outfits[1].image_url = "https://example.test/outfit.png".to_string();

        let err = state.begin_edit(OutfitStyle::Business, "brighter").unwrap_err();
        assert!(matches!(err, StylistError::Format(_)));
        assert_eq!(state.error(), Some(EDIT_BANNER));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_edit_unknown_style() {
        let mut state = WorkflowState::new();
        state.begin_upload(ImageFile::from_path("shirt.png"));
        state.generating = false;

        let err = state.begin_edit(OutfitStyle::Casual, "brighter").unwrap_err();
        assert!(matches!(err, StylistError::UnknownOutfit(OutfitStyle::Casual)));
    }

    #[test]
    fn test_edit_replaces_only_target() {
        let mut state = displaying();
        let before = state.outfits().to_vec();

        let ticket = state.begin_edit(OutfitStyle::Casual, "roll up the sleeves").unwrap();
        assert_eq!(ticket.image, EncodedImage::new("image/png", "Casual"));

        let new_url = EncodedImage::new("image/webp", "bmV3").to_data_url();
        let updated = state.finish_edit(ticket, Ok(new_url.clone())).unwrap();

        assert_eq!(updated, Outfit::new(OutfitStyle::Casual, new_url));
        assert_eq!(state.outfits()[0], updated);
        assert_eq!(state.outfits()[1..], before[1..]);
        assert_eq!(state.editing(), None);
    }

    #[test]
    fn test_failed_edit_preserves_outfit() {
        let mut state = displaying();
        let before = state.outfits().to_vec();

        let ticket = state.begin_edit(OutfitStyle::Evening, "sequins").unwrap();
        let result = state.finish_edit(ticket, Err(StylistError::Edit("no image".into())));

        assert!(result.is_err());
        assert_eq!(state.outfits(), before.as_slice());
        assert_eq!(state.error(), Some(EDIT_BANNER));
        assert_eq!(state.phase(), Phase::Displaying);
    }

    #[test]
    fn test_stale_edit_is_ignored_after_reset() {
        let mut state = displaying();
        let ticket = state.begin_edit(OutfitStyle::Casual, "darker").unwrap();
        state.reset();

        let result = state.finish_edit(ticket, Ok("data:image/png;base64,AAAA".into()));
        assert!(matches!(result, Err(StylistError::Discarded)));
        assert!(state.outfits().is_empty());
    }

    #[test]
    fn test_regenerate_requires_upload() {
        let mut state = WorkflowState::new();
        assert!(matches!(state.begin_regenerate(), Err(StylistError::NothingUploaded)));

        let mut state = displaying();
        let session = state.session();
        let (ticket, file) = state.begin_regenerate().unwrap();
        assert_eq!(ticket.session, session + 1);
        assert_eq!(file, ImageFile::from_path("shirt.png"));
        assert!(state.outfits().is_empty());
    }
}
