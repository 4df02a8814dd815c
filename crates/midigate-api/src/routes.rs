//! API routes.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::DeploymentMode;
use crate::handlers::{health, ping, relay_upload, transcribe_via_queue};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, payload_too_large_envelope, request_id, request_logging};
use crate::state::AppState;

/// Create the API router for the configured deployment mode.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut upload_routes = Router::new();

    match state.mode() {
        DeploymentMode::Direct => {
            for endpoint in state.config.endpoints.iter().cloned() {
                let route = endpoint.route.clone();
                upload_routes = upload_routes.route(
                    &route,
                    post(
                        move |State(state): State<AppState>,
                              multipart: Result<Multipart, MultipartRejection>| {
                            relay_upload(state, endpoint.clone(), multipart)
                        },
                    ),
                );
            }
        }
        DeploymentMode::Queue => {
            upload_routes =
                upload_routes.route(&state.config.queue_route, post(transcribe_via_queue));
        }
    }

    // Uploads are bounded by MAX_BODY_SIZE, not the extractor default.
    let upload_routes = upload_routes
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::map_response_with_state(
            state.config.max_body_size,
            payload_too_large_envelope,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ping", get(ping));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(upload_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
