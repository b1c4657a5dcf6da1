// Stylist - drives the workflow: decode, parallel per-style generation, edits

use super::backend::GenerationBackend;
use super::codec;
use super::error::{Result, StylistError};
use super::generator::OutfitGenerator;
use super::profile::ProfileStore;
use super::types::{ImageFile, Outfit, OutfitStyle, UserProfile};
use super::workflow::{GenerationTicket, WorkflowState};
use futures_util::future::try_join_all;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Owns the workflow state and turns user intents into transitions.
///
/// State flows out through [`Stylist::subscribe`]; intents come in as method
/// calls. All methods take `&self`, so a reset can land while a generation or
/// edit is still awaiting the backend.
pub struct Stylist {
    generator: OutfitGenerator,
    profile: ProfileStore,
    state: watch::Sender<WorkflowState>,
}

impl Stylist {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_profile(backend, UserProfile::default())
    }

    pub fn with_profile(backend: Arc<dyn GenerationBackend>, profile: UserProfile) -> Self {
        let (state, _) = watch::channel(WorkflowState::new());
        Self {
            generator: OutfitGenerator::new(backend),
            profile: ProfileStore::with_profile(profile),
            state,
        }
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    pub fn profile(&self) -> UserProfile {
        self.profile.snapshot()
    }

    /// Replace the profile; applies to generations started afterwards
    pub fn save_profile(&self, profile: UserProfile) {
        self.profile.save(profile);
    }

    fn apply<T>(&self, transition: impl FnOnce(&mut WorkflowState) -> Result<T>) -> Result<T> {
        let mut outcome = Err(StylistError::Discarded);
        self.state.send_modify(|state| outcome = transition(state));
        outcome
    }

    /// Upload a new item and generate one outfit per style
    pub async fn upload(&self, file: ImageFile) -> Result<Vec<Outfit>> {
        let ticket = self.apply(|state| Ok(state.begin_upload(file.clone())))?;
        self.run_generation(ticket, file).await
    }

    /// Generate again for the current upload, e.g. after a failure
    pub async fn regenerate(&self) -> Result<Vec<Outfit>> {
        let (ticket, file) = self.apply(WorkflowState::begin_regenerate)?;
        self.run_generation(ticket, file).await
    }

    async fn run_generation(&self, ticket: GenerationTicket, file: ImageFile) -> Result<Vec<Outfit>> {
        let profile = self.profile.snapshot();
        let result = self.generate_batch(&file, &profile).await;
        self.apply(|state| state.finish_generation(ticket, result))
    }

    /// Fan out one request per style and wait for all of them.
    ///
    /// The first failure fails the batch; `try_join_all` keeps input order, so
    /// the batch is in style order whatever order the calls finish in.
    async fn generate_batch(&self, file: &ImageFile, profile: &UserProfile) -> Result<Vec<Outfit>> {
        let image = codec::encode_file(file).await?;
        info!(
            backend = self.generator.backend_name(),
            media_type = %image.media_type,
            styles = OutfitStyle::ALL.len(),
            "generating outfits"
        );

        try_join_all(
            OutfitStyle::ALL
                .into_iter()
                .map(|style| self.generator.generate_styled_outfit(&image, style, profile)),
        )
        .await
    }

    /// Apply a text edit to one outfit, located by its style
    pub async fn edit(&self, outfit: &Outfit, instruction: &str) -> Result<Outfit> {
        self.edit_style(outfit.style, instruction).await
    }

    pub async fn edit_style(&self, style: OutfitStyle, instruction: &str) -> Result<Outfit> {
        let ticket = self.apply(|state| state.begin_edit(style, instruction))?;
        let result = self
            .generator
            .edit_image(&ticket.image, &ticket.instruction)
            .await;
        self.apply(|state| state.finish_edit(ticket, result))
    }

    /// Return to idle; anything still in flight will be ignored when it lands
    pub fn reset(&self) {
        self.state.send_modify(WorkflowState::reset);
    }

    pub fn dismiss_error(&self) {
        self.state.send_modify(WorkflowState::dismiss_error);
    }
}
