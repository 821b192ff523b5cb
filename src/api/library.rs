//! Category and asset endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::image_data::import_image;
use crate::library::{Asset, AssetDraft, Category, CategoryDraft};
use crate::studio::StudioError;

/// Build library router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(add_category))
        .route("/categories/{name}", delete(delete_category))
        .route("/categories/{name}/activate", post(activate_category))
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/{id}", put(update_asset).delete(delete_asset))
        .route("/images/import", post(import_asset_image))
}

/// Category listing
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
    pub active: Option<String>,
}

async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let studio = state.studio.lock();
    Json(CategoriesResponse {
        categories: studio.library().categories().to_vec(),
        active: studio.active_category().map(String::from),
    })
}

async fn add_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryDraft>,
) -> Response {
    let result = state.studio.lock().add_category(&req);
    match result {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cascade delete response
#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub removed_assets: Vec<String>,
}

async fn delete_category(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let result = state.studio.lock().delete_category(&name);
    match result {
        Ok(removed_assets) => Json(DeleteCategoryResponse { removed_assets }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn activate_category(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let result = state.studio.lock().set_active_category(&name);
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Asset listing filter
#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub category: Option<String>,
}

async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> Json<Vec<Asset>> {
    let studio = state.studio.lock();
    let assets = match query.category {
        Some(category) => studio
            .library()
            .assets_in(&category)
            .into_iter()
            .cloned()
            .collect(),
        None => studio.library().assets().to_vec(),
    };
    Json(assets)
}

async fn create_asset(State(state): State<AppState>, Json(req): Json<AssetDraft>) -> Response {
    let result = state.studio.lock().create_asset(&req);
    match result {
        Ok(asset) => (StatusCode::CREATED, Json(asset)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssetDraft>,
) -> Response {
    let result = state.studio.lock().update_asset(&id, &req);
    match result {
        Ok(asset) => Json(asset).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_asset(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = state.studio.lock().delete_asset(&id);
    match result {
        Ok(asset) => Json(asset).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Imported image
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Data URI to put in the asset form
    pub image: String,
    pub size_bytes: usize,
}

/// Turn an uploaded file into a data URI for the asset form
async fn import_asset_image(headers: HeaderMap, body: Bytes) -> Response {
    if body.is_empty() {
        return StudioError::MissingField("visual DNA image").into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    Json(ImportResponse {
        image: import_image(&body, content_type),
        size_bytes: body.len(),
    })
    .into_response()
}
