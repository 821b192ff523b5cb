//! Generation, status, current result and history endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use super::{error_response, AppState};
use crate::studio::{GenerationResult, RequestState};

/// Build generation router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/status", get(status))
        .route("/result", get(current_result))
        .route("/result/download", get(download_result))
        .route("/history", get(history))
        .route("/history/{id}/select", post(select_history))
}

/// Body returned when the model answered without an image
#[derive(Debug, Serialize)]
pub struct EmptyResponse {
    pub status: &'static str,
}

/// Run one generation
///
/// The call runs on its own task so the slot is released even if the
/// client disconnects mid-request.
async fn generate(State(state): State<AppState>) -> Response {
    let begun = state.studio.lock().begin_generation();
    let ticket = match begun {
        Ok(ticket) => ticket,
        Err(e) => return e.into_response(),
    };

    let ticket_id = ticket.id.clone();
    let generator = state.generator.clone();
    let studio = state.studio.clone();
    let task = tokio::spawn(async move {
        let result = generator.generate(&ticket.request).await;
        studio.lock().complete_generation(ticket, result)
    });

    match task.await {
        Ok(Ok(RequestState::Succeeded { result_id })) => {
            let entry = state
                .studio
                .lock()
                .history()
                .iter()
                .find(|h| h.id == result_id)
                .cloned();
            match entry {
                Some(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
                None => error_response(StatusCode::INTERNAL_SERVER_ERROR, "result missing from history"),
            }
        }
        Ok(Ok(RequestState::Empty)) => Json(EmptyResponse { status: "empty" }).into_response(),
        Ok(Ok(RequestState::Failed { error })) => error_response(StatusCode::BAD_GATEWAY, error),
        Ok(Ok(other)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unexpected request state: {:?}", other),
        ),
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            warn!("Generation task panicked: {}", e);
            if let Err(e) = state
                .studio
                .lock()
                .abort_generation(&ticket_id, "generation task failed")
            {
                warn!("Could not release generation slot: {}", e);
            }
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "generation task failed")
        }
    }
}

/// Slot status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub request: RequestState,
    pub can_submit: bool,
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let studio = state.studio.lock();
    Json(StatusResponse {
        request: studio.request_state().clone(),
        can_submit: studio.can_submit(),
    })
}

/// Current result
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub image: Option<String>,
}

async fn current_result(State(state): State<AppState>) -> Json<ResultResponse> {
    Json(ResultResponse {
        image: state.studio.lock().current_result().map(String::from),
    })
}

/// Current result as an image file attachment
async fn download_result(State(state): State<AppState>) -> Response {
    let download = state.studio.lock().download_result();
    match download {
        Ok(download) => (
            [
                (header::CONTENT_TYPE, download.mime_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", download.filename),
                ),
            ],
            download.bytes,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn history(State(state): State<AppState>) -> Json<Vec<GenerationResult>> {
    Json(state.studio.lock().history().to_vec())
}

async fn select_history(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut studio = state.studio.lock();
    match studio.select_history(&id) {
        Ok(entry) => Json(entry.clone()).into_response(),
        Err(e) => e.into_response(),
    }
}
