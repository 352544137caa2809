use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::errors::{ApiError, AppError};
use crate::application::services::Mutation;
use crate::application::state::AppState;
use crate::domain::images::{GeneratedImage, NewGeneratedImage, decode_image_payload};
use crate::domain::listing::SortCriterion;

const PERSISTENCE_WARNING: &str =
    "gallery changes could not be written to durable storage; they remain available this session";

#[derive(Debug, Serialize)]
pub(crate) struct ImageView {
    id: String,
    prompt: String,
    created_at: DateTime<Utc>,
    is_favorite: bool,
    image_url: String,
}

impl ImageView {
    fn from_image(image: &GeneratedImage, favorites: &HashSet<String>) -> Self {
        Self {
            id: image.id.clone(),
            prompt: image.prompt.clone(),
            created_at: image.created_at,
            is_favorite: favorites.contains(&image.id),
            image_url: format!("/api/v1/gallery/{}/image", image.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GalleryResponse {
    images: Vec<ImageView>,
    persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

impl GalleryResponse {
    fn new(images: &[GeneratedImage], favorites: &HashSet<String>, persisted: bool) -> Self {
        Self {
            images: images
                .iter()
                .map(|image| ImageView::from_image(image, favorites))
                .collect(),
            persisted,
            warning: (!persisted).then_some(PERSISTENCE_WARNING),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GalleryQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    sort: Option<String>,
}

#[tracing::instrument(skip(state))]
pub(crate) async fn list_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<GalleryResponse>, ApiError> {
    let criterion = match query.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => Some(
            SortCriterion::from_query(value)
                .ok_or_else(|| AppError::validation("unknown sort criterion"))?,
        ),
        None => None,
    };

    let search = query.q.unwrap_or_default();
    let images = state.gallery.list(&search, criterion).await;
    let favorites = state.gallery.favorites().await;

    Ok(Json(GalleryResponse::new(&images, &favorites, true)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveImageRequest {
    prompt: String,
    /// Image bytes as a `data:` URL or bare base64.
    image: String,
}

#[tracing::instrument(skip(state, payload))]
pub(crate) async fn save_image(
    State(state): State<AppState>,
    Json(payload): Json<SaveImageRequest>,
) -> Result<Response, ApiError> {
    let prompt = payload.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(AppError::validation("prompt is required").into());
    }

    let (content_type, image_data) = decode_image_payload(&payload.image)
        .map_err(|err| AppError::validation(err.to_string()))?;

    let Mutation { value, persisted } = state
        .gallery
        .insert(NewGeneratedImage {
            prompt,
            content_type,
            image_data,
        })
        .await;

    info!(id = %value[0].id, "image saved to gallery");

    let favorites = state.gallery.favorites().await;
    let body = GalleryResponse::new(&value, &favorites, persisted);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_image_bytes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = state
        .gallery
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found("image not found"))?;

    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = format!("inline; filename=\"{}\"", image.download_filename());

    let mut response = image.image_data.into_response();
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

#[tracing::instrument(skip(state))]
pub(crate) async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GalleryResponse>, ApiError> {
    let Mutation { value, persisted } = state.gallery.delete(&id).await;

    info!(%id, "image deleted");

    let favorites = state.gallery.favorites().await;
    Ok(Json(GalleryResponse::new(&value, &favorites, persisted)))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn clear_gallery(
    State(state): State<AppState>,
) -> Result<Json<GalleryResponse>, ApiError> {
    let Mutation { value, persisted } = state.gallery.clear().await;

    info!("gallery cleared");

    let favorites = state.gallery.favorites().await;
    Ok(Json(GalleryResponse::new(&value, &favorites, persisted)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReorderRequest {
    ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReorderResponse {
    images: Vec<ImageView>,
    changed: bool,
    persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

#[tracing::instrument(skip(state, payload))]
pub(crate) async fn reorder_gallery(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<ReorderResponse>, ApiError> {
    let Mutation { value, persisted } = state
        .gallery
        .reorder(&payload.ids)
        .await
        .map_err(ApiError::from)?;

    if value.changed {
        info!("gallery reordered");
    }

    let favorites = state.gallery.favorites().await;
    Ok(Json(ReorderResponse {
        images: value
            .images
            .iter()
            .map(|image| ImageView::from_image(image, &favorites))
            .collect(),
        changed: value.changed,
        persisted,
        warning: (!persisted).then_some(PERSISTENCE_WARNING),
    }))
}

#[derive(Debug, Serialize)]
pub(crate) struct FavoriteResponse {
    id: String,
    is_favorite: bool,
    persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

#[tracing::instrument(skip(state))]
pub(crate) async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let Mutation { value, persisted } = state
        .gallery
        .toggle_favorite(&id)
        .await
        .map_err(ApiError::from)?;

    info!(%id, is_favorite = value, "favorite toggled");

    Ok(Json(FavoriteResponse {
        id,
        is_favorite: value,
        persisted,
        warning: (!persisted).then_some(PERSISTENCE_WARNING),
    }))
}
