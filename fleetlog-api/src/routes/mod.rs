//! REST API Routes Module
//!
//! Includes:
//! - Trip form submission routes for drivers
//! - Admin review routes
//! - Health check endpoints
//! - Prometheus metrics and the OpenAPI document

pub mod admin;
pub mod forms;
pub mod health;

use std::time::Duration;

use axum::{
    http::{header, request, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::ApiConfig,
    openapi::ApiDoc,
    state::AppState,
    telemetry::{metrics_handler, observability_middleware},
};

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let allowed = config.clone();
        cors.allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &request::Parts| {
                origin
                    .to_str()
                    .map(|o| allowed.is_origin_allowed(o))
                    .unwrap_or(false)
            },
        ))
    }
}

/// Create the complete API router.
///
/// - /api/v1/forms/* - driver submission workflow
/// - /api/v1/admin/forms/* - review and audit
/// - /health/* - liveness and readiness
/// - /metrics - Prometheus exposition
/// - /openapi.json - OpenAPI document
pub fn create_api_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    Router::new()
        .nest("/api/v1/forms", forms::create_router(state.clone()))
        .nest("/api/v1/admin/forms", admin::create_router(state.clone()))
        .nest("/health", health::create_router(state))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
