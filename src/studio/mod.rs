//! Studio controller
//!
//! `StudioState` owns everything the front end can change: the library,
//! selection, enhancer controls, settings, user prompt, external reference,
//! current result, history and the generation slot. All changes go through
//! the update methods here so the selection and library invariants hold:
//! - selected ids always name existing assets
//! - the active category, if any, exists
//! - at most one generation is in flight

mod history;
mod request;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::composer::{self, ComposedPrompt};
use crate::controls::{ControlError, ControlSet, EnhancerDimension};
use crate::gemini::{GenerationError, GenerationOutcome, GenerationRequest};
use crate::image_data::{DataUri, DataUriError, DEFAULT_UPLOAD_MIME};
use crate::library::{Asset, AssetDraft, Category, CategoryDraft, Library, LibraryError};

pub use history::{GenerationResult, Quality, Resolution, ResultDownload, Settings};
pub use request::{GenerationTicket, RequestState};

/// Studio errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("history entry not found: {0}")]
    HistoryNotFound(String),

    #[error("no result to download")]
    NoResult,

    #[error("current result is not a downloadable image: {0}")]
    InvalidImage(#[from] DataUriError),

    #[error("nothing to generate: enter a prompt or select an asset")]
    NothingToGenerate,

    #[error("a generation is already in progress")]
    Busy,

    #[error("no generation in progress for ticket {0}")]
    StaleTicket(String),
}

/// A state change driven by the front end
#[derive(Debug, Clone)]
pub enum Action {
    AddCategory(CategoryDraft),
    DeleteCategory(String),
    /// Create when `id` is `None`, otherwise edit in place
    SaveAsset {
        id: Option<String>,
        draft: AssetDraft,
    },
    DeleteAsset(String),
    ToggleAsset(String),
    DeselectAsset(String),
    SetControl {
        dimension: EnhancerDimension,
        value: String,
    },
    SetSettings(Settings),
    SetUserPrompt(String),
    SetReference(String),
    ClearReference,
    SelectHistory(String),
    SetActiveCategory(String),
}

/// Application state
#[derive(Debug, Clone)]
pub struct StudioState {
    library: Library,
    /// Selected asset ids in selection order
    selection: Vec<String>,
    controls: ControlSet,
    settings: Settings,
    user_prompt: String,
    external_reference: Option<String>,
    current_result: Option<String>,
    /// Newest first
    history: Vec<GenerationResult>,
    active_category: Option<String>,
    request: RequestState,
}

impl StudioState {
    /// Create a studio over a library
    pub fn new(library: Library, settings: Settings) -> Self {
        let active_category = library.categories().first().map(|c| c.name.clone());
        Self {
            library,
            selection: Vec::new(),
            controls: ControlSet::new(),
            settings,
            user_prompt: String::new(),
            external_reference: None,
            current_result: None,
            history: Vec::new(),
            active_category,
            request: RequestState::Idle,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Selected assets in selection order
    pub fn selected_assets(&self) -> Vec<&Asset> {
        self.selection
            .iter()
            .filter_map(|id| self.library.asset(id))
            .collect()
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    pub fn external_reference(&self) -> Option<&str> {
        self.external_reference.as_deref()
    }

    pub fn current_result(&self) -> Option<&str> {
        self.current_result.as_deref()
    }

    pub fn history(&self) -> &[GenerationResult] {
        &self.history
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    pub fn request_state(&self) -> &RequestState {
        &self.request
    }

    /// Apply one action; on error nothing has changed
    pub fn apply(&mut self, action: Action) -> Result<(), StudioError> {
        match action {
            Action::AddCategory(draft) => self.add_category(&draft).map(drop),
            Action::DeleteCategory(name) => self.delete_category(&name).map(drop),
            Action::SaveAsset { id: None, draft } => self.create_asset(&draft).map(drop),
            Action::SaveAsset { id: Some(id), draft } => self.update_asset(&id, &draft).map(drop),
            Action::DeleteAsset(id) => self.delete_asset(&id).map(drop),
            Action::ToggleAsset(id) => self.toggle_asset(&id).map(drop),
            Action::DeselectAsset(id) => {
                self.deselect_asset(&id);
                Ok(())
            }
            Action::SetControl { dimension, value } => self.set_control(dimension, &value),
            Action::SetSettings(settings) => self.set_settings(settings),
            Action::SetUserPrompt(text) => {
                self.set_user_prompt(&text);
                Ok(())
            }
            Action::SetReference(data_uri) => {
                self.set_external_reference(data_uri);
                Ok(())
            }
            Action::ClearReference => {
                self.clear_external_reference();
                Ok(())
            }
            Action::SelectHistory(id) => self.select_history(&id).map(drop),
            Action::SetActiveCategory(name) => self.set_active_category(&name),
        }
    }

    // Library

    /// Add a category and make it the active one
    pub fn add_category(&mut self, draft: &CategoryDraft) -> Result<Category, StudioError> {
        let category = self.library.add_category(draft)?;
        self.active_category = Some(category.name.clone());
        Ok(category)
    }

    /// Delete a category with its assets and deselect them
    ///
    /// Returns the removed asset ids.
    pub fn delete_category(&mut self, name: &str) -> Result<Vec<String>, StudioError> {
        let removed = self.library.delete_category(name)?;
        self.prune_selection();

        if self.active_category.as_deref() == Some(name) {
            self.active_category = self.library.categories().first().map(|c| c.name.clone());
        }

        Ok(removed)
    }

    pub fn create_asset(&mut self, draft: &AssetDraft) -> Result<Asset, StudioError> {
        Ok(self.library.create_asset(draft)?)
    }

    pub fn update_asset(&mut self, id: &str, draft: &AssetDraft) -> Result<Asset, StudioError> {
        Ok(self.library.update_asset(id, draft)?)
    }

    /// Delete an asset and deselect it
    pub fn delete_asset(&mut self, id: &str) -> Result<Asset, StudioError> {
        let asset = self.library.delete_asset(id)?;
        self.selection.retain(|sid| sid != id);
        Ok(asset)
    }

    pub fn set_active_category(&mut self, name: &str) -> Result<(), StudioError> {
        if !self.library.has_category(name) {
            return Err(LibraryError::CategoryNotFound(name.to_string()).into());
        }
        self.active_category = Some(name.to_string());
        Ok(())
    }

    fn prune_selection(&mut self) {
        let library = &self.library;
        self.selection.retain(|id| library.asset(id).is_some());
    }

    // Selection

    /// Toggle an asset in or out of the selection
    ///
    /// Returns whether the asset is selected afterwards.
    pub fn toggle_asset(&mut self, id: &str) -> Result<bool, StudioError> {
        if let Some(pos) = self.selection.iter().position(|sid| sid == id) {
            self.selection.remove(pos);
            return Ok(false);
        }
        if self.library.asset(id).is_none() {
            return Err(LibraryError::AssetNotFound(id.to_string()).into());
        }
        self.selection.push(id.to_string());
        Ok(true)
    }

    /// Remove an asset from the selection if present
    pub fn deselect_asset(&mut self, id: &str) {
        self.selection.retain(|sid| sid != id);
    }

    // Controls, settings, inputs

    pub fn set_control(&mut self, dimension: EnhancerDimension, value: &str) -> Result<(), StudioError> {
        Ok(self.controls.set(dimension, value)?)
    }

    pub fn set_settings(&mut self, settings: Settings) -> Result<(), StudioError> {
        if settings.model.trim().is_empty() {
            return Err(StudioError::MissingField("model"));
        }
        self.settings = settings;
        Ok(())
    }

    pub fn set_user_prompt(&mut self, text: &str) {
        self.user_prompt = text.to_string();
    }

    pub fn set_external_reference(&mut self, data_uri: String) {
        self.external_reference = Some(data_uri);
    }

    pub fn clear_external_reference(&mut self) {
        self.external_reference = None;
    }

    /// Show a past result as the current one
    pub fn select_history(&mut self, id: &str) -> Result<&GenerationResult, StudioError> {
        let entry = self
            .history
            .iter()
            .find(|h| h.id == id)
            .ok_or_else(|| StudioError::HistoryNotFound(id.to_string()))?;
        self.current_result = Some(entry.image.clone());
        Ok(entry)
    }

    /// Decode the current result for download
    pub fn download_result(&self) -> Result<ResultDownload, StudioError> {
        let uri = self.current_result.as_deref().ok_or(StudioError::NoResult)?;
        let parsed = DataUri::parse(uri)?;
        let bytes = parsed.decode()?;

        Ok(ResultDownload {
            mime_type: parsed
                .mime_type
                .unwrap_or_else(|| DEFAULT_UPLOAD_MIME.to_string()),
            filename: format!("visionary-{}.png", Utc::now().timestamp_millis()),
            bytes,
        })
    }

    // Generation

    /// Compose the prompt from the current state
    pub fn compose(&self) -> ComposedPrompt {
        composer::compose(
            &self.selected_assets(),
            &self.controls,
            &self.user_prompt,
            self.external_reference.as_deref(),
        )
    }

    /// Whether a generation could be submitted right now
    pub fn can_submit(&self) -> bool {
        !self.request.is_requesting() && (!self.user_prompt.is_empty() || !self.selection.is_empty())
    }

    /// Take the generation slot and freeze the request
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, StudioError> {
        if self.request.is_requesting() {
            return Err(StudioError::Busy);
        }
        if self.user_prompt.is_empty() && self.selection.is_empty() {
            return Err(StudioError::NothingToGenerate);
        }

        let composed = self.compose();
        if composed.is_empty() {
            return Err(StudioError::NothingToGenerate);
        }

        let ticket = GenerationTicket {
            id: uuid::Uuid::new_v4().to_string(),
            request: GenerationRequest {
                prompt: composed.text,
                reference_images: composed.reference_images,
                aspect_ratio: self.controls.aspect_ratio().to_string(),
                model: self.settings.model.clone(),
                seed: self.settings.seed(),
            },
            assets_used: self.selection.clone(),
        };

        self.request = RequestState::Requesting {
            ticket_id: ticket.id.clone(),
            started_at: Utc::now(),
        };

        debug!("Generation {} started: {}", ticket.id, ticket.request.prompt);
        Ok(ticket)
    }

    /// Record the outcome of a ticket and release the slot
    ///
    /// Only an image changes the current result and history. Returns the
    /// terminal request state.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<GenerationOutcome, GenerationError>,
    ) -> Result<RequestState, StudioError> {
        match &self.request {
            RequestState::Requesting { ticket_id, .. } if *ticket_id == ticket.id => {}
            _ => return Err(StudioError::StaleTicket(ticket.id)),
        }

        self.request = match result {
            Ok(GenerationOutcome::Image(image)) => {
                let entry = GenerationResult {
                    id: uuid::Uuid::new_v4().to_string(),
                    image: image.clone(),
                    prompt: ticket.request.prompt,
                    timestamp: Utc::now(),
                    assets_used: ticket.assets_used,
                    seed: ticket.request.seed,
                };
                let result_id = entry.id.clone();
                info!("Generation {} produced image {}", ticket.id, result_id);

                self.current_result = Some(image);
                self.history.insert(0, entry);
                RequestState::Succeeded { result_id }
            }
            Ok(GenerationOutcome::Empty) => {
                info!("Generation {} produced no image", ticket.id);
                RequestState::Empty
            }
            Err(e) => {
                error!("Image generation failed: {}", e);
                RequestState::Failed {
                    error: e.to_string(),
                }
            }
        };

        Ok(self.request.clone())
    }

    /// Release the slot for a ticket whose call never reported back
    pub fn abort_generation(&mut self, ticket_id: &str, reason: &str) -> Result<(), StudioError> {
        match &self.request {
            RequestState::Requesting { ticket_id: current, .. } if current == ticket_id => {}
            _ => return Err(StudioError::StaleTicket(ticket_id.to_string())),
        }

        error!("Generation {} aborted: {}", ticket_id, reason);
        self.request = RequestState::Failed {
            error: reason.to_string(),
        };
        Ok(())
    }
}

impl Default for StudioState {
    fn default() -> Self {
        Self::new(Library::with_defaults(), Settings::default())
    }
}
