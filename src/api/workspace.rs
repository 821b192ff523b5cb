//! Composition workspace endpoints: selection, enhancer controls, settings,
//! user prompt and the external reference image

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::controls::{ControlError, ControlSet, EnhancerDimension};
use crate::image_data::import_image;
use crate::library::Asset;
use crate::studio::{Action, Settings, StudioError};

/// Build workspace router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/selection", get(get_selection))
        .route("/selection/{id}", post(toggle_selection).delete(deselect))
        .route("/controls", get(get_controls))
        .route("/controls/options", get(control_options))
        .route("/controls/{dimension}", put(set_control))
        .route("/settings", get(get_settings).put(set_settings))
        .route("/prompt", get(preview_prompt).put(set_prompt))
        .route("/reference", put(upload_reference).delete(clear_reference))
}

/// Selected assets in selection order
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: Vec<Asset>,
}

async fn get_selection(State(state): State<AppState>) -> Json<SelectionResponse> {
    let studio = state.studio.lock();
    Json(SelectionResponse {
        selected: studio.selected_assets().into_iter().cloned().collect(),
    })
}

/// Toggle response
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub selected: bool,
}

async fn toggle_selection(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = state.studio.lock().toggle_asset(&id);
    match result {
        Ok(selected) => Json(ToggleResponse { selected }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn deselect(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.studio.lock().deselect_asset(&id);
    StatusCode::NO_CONTENT
}

async fn get_controls(State(state): State<AppState>) -> Json<ControlSet> {
    Json(state.studio.lock().controls().clone())
}

/// One dimension of the option catalog
#[derive(Debug, Serialize)]
pub struct ControlOptions {
    pub key: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

async fn control_options() -> Json<Vec<ControlOptions>> {
    Json(
        EnhancerDimension::ALL
            .iter()
            .map(|d| ControlOptions {
                key: d.key(),
                label: d.label(),
                options: d.options(),
            })
            .collect(),
    )
}

/// Set control request
#[derive(Debug, Deserialize)]
pub struct SetControlRequest {
    pub value: String,
}

async fn set_control(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    Json(req): Json<SetControlRequest>,
) -> Response {
    let Some(dimension) = EnhancerDimension::from_key(&dimension) else {
        return StudioError::from(ControlError::UnknownDimension(dimension)).into_response();
    };

    let mut studio = state.studio.lock();
    match studio.apply(Action::SetControl {
        dimension,
        value: req.value,
    }) {
        Ok(()) => Json(studio.controls().clone()).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.studio.lock().settings().clone())
}

async fn set_settings(State(state): State<AppState>, Json(req): Json<Settings>) -> Response {
    let mut studio = state.studio.lock();
    match studio.set_settings(req) {
        Ok(()) => Json(studio.settings().clone()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Composed prompt preview
#[derive(Debug, Serialize)]
pub struct PromptPreview {
    pub user_prompt: String,
    pub text: String,
    pub fragments: Vec<String>,
    pub reference_images: usize,
    pub can_submit: bool,
}

async fn preview_prompt(State(state): State<AppState>) -> Json<PromptPreview> {
    let studio = state.studio.lock();
    let composed = studio.compose();
    Json(PromptPreview {
        user_prompt: studio.user_prompt().to_string(),
        text: composed.text,
        fragments: composed.fragments,
        reference_images: composed.reference_images.len(),
        can_submit: studio.can_submit(),
    })
}

/// Set user prompt request
#[derive(Debug, Deserialize)]
pub struct SetPromptRequest {
    pub text: String,
}

async fn set_prompt(State(state): State<AppState>, Json(req): Json<SetPromptRequest>) -> Response {
    match state.studio.lock().apply(Action::SetUserPrompt(req.text)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Reference upload response
#[derive(Debug, Serialize)]
pub struct ReferenceResponse {
    pub size_bytes: usize,
}

/// Import an uploaded image as the external reference
async fn upload_reference(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if body.is_empty() {
        return StudioError::MissingField("reference image").into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let data_uri = import_image(&body, content_type);

    if let Err(e) = state.studio.lock().apply(Action::SetReference(data_uri)) {
        return e.into_response();
    }
    Json(ReferenceResponse {
        size_bytes: body.len(),
    })
    .into_response()
}

async fn clear_reference(State(state): State<AppState>) -> StatusCode {
    state.studio.lock().clear_external_reference();
    StatusCode::NO_CONTENT
}
