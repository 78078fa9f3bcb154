//! HTTP surface for the deepfake detector.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use state::AppState;

/// Build the application router with body limit, CORS and request tracing.
pub fn build_app(state: AppState, config: &ServerConfig) -> Result<Router> {
    let cors = build_cors_layer(&config.cors_origins)?;

    Ok(routes::build_routes()
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(state)))
}

/// Listed origins only, with credentials. Methods and headers are mirrored
/// from the preflight since wildcards cannot be combined with credentials.
fn build_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
