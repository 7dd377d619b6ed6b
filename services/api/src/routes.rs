use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::infra::{AppState, Engine};
use zonecert::bulk::bulk_router;
use zonecert::verification::verification_router;
use zonecert::zones::zone_router;

pub(crate) fn with_engine_routes(engine: &Engine) -> axum::Router {
    verification_router(engine.service.clone())
        .merge(bulk_router(engine.orchestrator.clone()))
        .merge(zone_router(engine.zones.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

#[derive(Serialize)]
pub(crate) struct StatusPayload {
    status: &'static str,
}

pub(crate) async fn healthcheck() -> Json<StatusPayload> {
    Json(StatusPayload { status: "ok" })
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    if ready {
        (StatusCode::OK, Json(StatusPayload { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusPayload {
                status: "initializing",
            }),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
