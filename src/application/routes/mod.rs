pub mod credential;
pub mod gallery;
pub mod generate;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Request};
use axum::middleware;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::application::rate_limit::{self, RateLimiter};
use crate::application::state::AppState;

/// 10 MB request body limit; image payloads arrive base64-encoded in JSON.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Maximum synthesis requests per IP per minute.
const GENERATE_RATE_LIMIT_PER_MINUTE: u32 = 10;

pub fn app_router(state: AppState) -> axum::Router {
    let limiter = Arc::new(RateLimiter::per_minute(GENERATE_RATE_LIMIT_PER_MINUTE));

    let generate = Router::new()
        .route("/generate", post(generate::generate_image))
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit::enforce));

    let api = Router::new()
        .merge(generate)
        .route(
            "/gallery",
            get(gallery::list_gallery)
                .post(gallery::save_image)
                .delete(gallery::clear_gallery),
        )
        .route("/gallery/order", put(gallery::reorder_gallery))
        .route("/gallery/{id}", axum::routing::delete(gallery::delete_image))
        .route("/gallery/{id}/image", get(gallery::get_image_bytes))
        .route("/gallery/{id}/favorite", post(gallery::toggle_favorite))
        .route(
            "/credential",
            get(credential::credential_status).put(credential::set_credential),
        )
        .route("/remix", post(generate::remix_prompt));

    axum::Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(EaselMakeSpan)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
                .layer(SetResponseHeaderLayer::overriding(
                    axum::http::header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
        .with_state(state)
}

#[derive(Clone)]
struct EaselMakeSpan;

impl<B> MakeSpan<B> for EaselMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}
