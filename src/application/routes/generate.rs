use axum::Json;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::prompts;
use crate::infrastructure::synthesis::synthesize;

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateRequest {
    prompt: String,
    #[serde(default)]
    credential: Option<String>,
}

/// Run the synthesis fallback loop and return raw image bytes.
///
/// Credential resolution: the request payload wins, then the user's stored
/// credential, then the operator-configured default inside the orchestrator.
#[tracing::instrument(skip(state, payload))]
pub(crate) async fn generate_image(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let credential = match payload.credential.filter(|c| !c.trim().is_empty()) {
        Some(credential) => Some(credential),
        None => state.gallery.credential().await,
    };

    let bytes = synthesize(
        &state.http_client,
        &state.synthesis,
        &payload.prompt,
        credential.as_deref(),
    )
    .await
    .map_err(AppError::from)?;

    info!(bytes = bytes.len(), "generation succeeded");

    let mut response = bytes.into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemixRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemixResponse {
    prompt: String,
    variation: &'static str,
}

/// Append a random style variation to a prompt.
pub(crate) async fn remix_prompt(
    Json(payload): Json<RemixRequest>,
) -> Result<Json<RemixResponse>, ApiError> {
    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::validation("prompt is required").into());
    }

    let (prompt, variation) = prompts::remix(prompt);
    Ok(Json(RemixResponse { prompt, variation }))
}
