use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Coordinate;
use super::index::ZoneIndexCell;
use super::resolver::{EligibilityResolver, EligibilityVerdict};

/// Diagnostic endpoint: resolve a raw coordinate against the current zone
/// index without a business record, mirroring the single-verification path.
pub fn zone_router(zones: Arc<ZoneIndexCell>) -> Router {
    Router::new()
        .route("/api/v1/zones/resolve", get(resolve_handler))
        .with_state(zones)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveQuery {
    lat: f64,
    lon: f64,
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveResponse {
    as_of: NaiveDate,
    verdict: EligibilityVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    nearest: Option<NearestZoneView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NearestZoneView {
    zone_id: String,
    distance_degrees: f64,
}

pub(crate) async fn resolve_handler(
    State(zones): State<Arc<ZoneIndexCell>>,
    Query(query): Query<ResolveQuery>,
) -> Response {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let point = Coordinate::new(query.lat, query.lon);
    let resolver = EligibilityResolver::new(zones.clone());
    let verdict = resolver.resolve(point, as_of);

    // Only surface the nearest zone when the point resolved to nothing;
    // inside a zone the distance is trivially zero.
    let nearest = if verdict.zone_id.is_none() {
        zones
            .snapshot()
            .nearest(point)
            .map(|(zone, distance)| NearestZoneView {
                zone_id: zone.id.0.clone(),
                distance_degrees: distance,
            })
    } else {
        None
    };

    (
        StatusCode::OK,
        axum::Json(ResolveResponse {
            as_of,
            verdict,
            nearest,
        }),
    )
        .into_response()
}
