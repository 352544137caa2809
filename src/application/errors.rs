use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::domain::StorageError;
use crate::infrastructure::synthesis::SynthesisError;

/// Application-level error taxonomy. Display strings are the user-facing
/// messages carried in JSON error responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("No API key available")]
    NoCredential,

    #[error("Invalid API key or insufficient permissions")]
    BackendUnauthorized,

    #[error("Rate limit exceeded for all models. Please wait a few minutes and try again.")]
    RateLimited,

    #[error("All AI models are currently loading. Please wait a few minutes and try again.")]
    ModelsLoading,

    #[error("All AI models are currently unavailable")]
    BackendsUnavailable,

    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        AppError::Unexpected(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoCredential | AppError::BackendUnauthorized => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::ModelsLoading | AppError::BackendsUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Remediation hint attached to the error body where one is actionable.
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            AppError::NoCredential => {
                Some("Please add your Hugging Face API key or contact the administrator.")
            }
            AppError::BackendUnauthorized => Some(
                "Please check your Hugging Face API key has 'Write' permissions and try again. \
                 Get one at https://huggingface.co/settings/tokens",
            ),
            AppError::BackendsUnavailable => {
                Some("Please try again later or check your API key permissions.")
            }
            _ => None,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        AppError::unexpected(error.to_string())
    }
}

impl From<SynthesisError> for AppError {
    fn from(error: SynthesisError) -> Self {
        match error {
            SynthesisError::EmptyPrompt => AppError::validation("prompt is required"),
            SynthesisError::NoCredential => AppError::NoCredential,
            SynthesisError::Unauthorized => AppError::BackendUnauthorized,
            SynthesisError::RateLimited => AppError::RateLimited,
            SynthesisError::ModelsLoading => AppError::ModelsLoading,
            SynthesisError::Unavailable => AppError::BackendsUnavailable,
        }
    }
}

/// Wrapper that renders an `AppError` as a JSON HTTP response.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        ApiError(error)
    }
}

impl From<SynthesisError> for ApiError {
    fn from(error: SynthesisError) -> Self {
        ApiError(AppError::from(error))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(error) = self;
        let status = error.status();

        if status.is_server_error() {
            tracing::error!(error = %error, "request failed");
        }

        let body = ErrorBody {
            error: error.to_string(),
            suggestion: error.suggestion(),
        };

        (status, Json(body)).into_response()
    }
}
