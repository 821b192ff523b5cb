//! HTTP API module - JSON endpoints over the studio state

mod generate;
mod library;
mod workspace;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use parking_lot::Mutex;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controls::ControlError;
use crate::gemini::ImageGenerator;
use crate::library::LibraryError;
use crate::studio::{StudioError, StudioState};

/// Largest accepted request body (images arrive inline)
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state
///
/// The studio lock is never held across an await.
#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<Mutex<StudioState>>,
    pub generator: Arc<dyn ImageGenerator>,
}

/// Build the API router
pub fn router(studio: StudioState, generator: Arc<dyn ImageGenerator>) -> Router {
    let state = AppState {
        studio: Arc::new(Mutex::new(studio)),
        generator,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(library::router())
        .merge(workspace::router())
        .merge(generate::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "visionary",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        generator: if state.generator.is_configured() {
            "configured"
        } else {
            "unconfigured"
        },
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    generator: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP status for a studio error
fn status_for(err: &StudioError) -> StatusCode {
    match err {
        StudioError::Library(LibraryError::MissingField(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        StudioError::Library(LibraryError::DuplicateCategory(_)) => StatusCode::CONFLICT,
        StudioError::Library(LibraryError::CategoryNotFound(_))
        | StudioError::Library(LibraryError::AssetNotFound(_))
        | StudioError::HistoryNotFound(_)
        | StudioError::NoResult => StatusCode::NOT_FOUND,
        StudioError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StudioError::Control(ControlError::UnknownDimension(_))
        | StudioError::Control(ControlError::UnknownOption { .. })
        | StudioError::MissingField(_)
        | StudioError::NothingToGenerate => StatusCode::UNPROCESSABLE_ENTITY,
        StudioError::Busy | StudioError::StaleTicket(_) => StatusCode::CONFLICT,
    }
}

/// Error body with a status and message
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for StudioError {
    fn into_response(self) -> Response {
        error_response(status_for(&self), self.to_string())
    }
}
