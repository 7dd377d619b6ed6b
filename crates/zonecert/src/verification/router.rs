use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{BusinessId, RiskLevel, TriggeredBy, VerificationStatus};
use super::service::{VerificationError, VerificationService};
use super::store::{BusinessDirectory, CoordinateResolver, VerificationFilter, VerificationStore};

/// Router builder exposing single-business verification and history queries.
pub fn verification_router<D, G, S>(service: Arc<VerificationService<D, G, S>>) -> Router
where
    D: BusinessDirectory + 'static,
    G: CoordinateResolver + 'static,
    S: VerificationStore + 'static,
{
    Router::new()
        .route("/api/v1/verifications", post(verify_handler::<D, G, S>))
        .route("/api/v1/verifications", get(query_handler::<D, G, S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyRequest {
    pub(crate) business_id: String,
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) operator: Option<String>,
}

pub(crate) async fn verify_handler<D, G, S>(
    State(service): State<Arc<VerificationService<D, G, S>>>,
    axum::Json(request): axum::Json<VerifyRequest>,
) -> Response
where
    D: BusinessDirectory + 'static,
    G: CoordinateResolver + 'static,
    S: VerificationStore + 'static,
{
    let business_id = match BusinessId::parse(&request.business_id) {
        Ok(id) => id,
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let triggered_by = TriggeredBy::Operator(request.operator.unwrap_or_else(|| "api".to_string()));

    match service.verify(&business_id, as_of, triggered_by) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(VerificationError::UnknownBusiness(id)) => {
            let payload = json!({
                "error": "business not found",
                "business_id": id.as_str(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err @ (VerificationError::Geocode(_) | VerificationError::Directory(_))) => {
            let payload = json!({ "error": err.to_string(), "retryable": err.is_retryable() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryQuery {
    pub(crate) business_id: Option<String>,
    pub(crate) status: Option<VerificationStatus>,
    pub(crate) risk_level: Option<RiskLevel>,
    pub(crate) from: Option<NaiveDate>,
    pub(crate) to: Option<NaiveDate>,
}

pub(crate) async fn query_handler<D, G, S>(
    State(service): State<Arc<VerificationService<D, G, S>>>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    D: BusinessDirectory + 'static,
    G: CoordinateResolver + 'static,
    S: VerificationStore + 'static,
{
    let business_id = match query.business_id.as_deref().map(BusinessId::parse) {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(err)) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let filter = VerificationFilter {
        business_id,
        status: query.status,
        risk_level: query.risk_level,
        from: query.from,
        to: query.to,
    };

    match service.query(&filter) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|r| r.summary_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
