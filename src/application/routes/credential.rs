use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::application::errors::ApiError;
use crate::application::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct SetCredentialRequest {
    credential: String,
}

/// Store the user's API credential (an empty value clears it). The secret is
/// never echoed back.
#[tracing::instrument(skip(state, payload))]
pub(crate) async fn set_credential(
    State(state): State<AppState>,
    Json(payload): Json<SetCredentialRequest>,
) -> Result<StatusCode, ApiError> {
    let outcome = state.gallery.set_credential(&payload.credential).await;

    if outcome.persisted {
        info!("stored credential updated");
    } else {
        warn!("credential updated in memory only; durable write failed");
    }

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialStatus {
    configured: bool,
}

/// Report whether any usable credential exists (stored or operator default)
/// without revealing it.
#[tracing::instrument(skip(state))]
pub(crate) async fn credential_status(
    State(state): State<AppState>,
) -> Result<Json<CredentialStatus>, ApiError> {
    let stored = state.gallery.credential().await.is_some();
    let fallback = !state.synthesis.default_credential.trim().is_empty();

    Ok(Json(CredentialStatus {
        configured: stored || fallback,
    }))
}
