use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;

use super::export::export_csv;
use super::intake::parse_identifiers;
use super::job::{BulkJob, ItemResult, JobError, JobId, JobSummary};
use super::orchestrator::BulkVerificationOrchestrator;
use crate::verification::store::{BusinessDirectory, CoordinateResolver, VerificationStore};

/// Router builder exposing batch submission, polling, cancellation, and
/// export. The request body is the batch file itself.
pub fn bulk_router<D, G, S>(orchestrator: Arc<BulkVerificationOrchestrator<D, G, S>>) -> Router
where
    D: BusinessDirectory + Send + Sync + 'static,
    G: CoordinateResolver + Send + Sync + 'static,
    S: VerificationStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/v1/verifications/bulk", post(submit_handler::<D, G, S>))
        .route(
            "/api/v1/verifications/bulk/:job_id",
            get(snapshot_handler::<D, G, S>),
        )
        .route(
            "/api/v1/verifications/bulk/:job_id/cancel",
            post(cancel_handler::<D, G, S>),
        )
        .route(
            "/api/v1/verifications/bulk/:job_id/export",
            get(export_handler::<D, G, S>),
        )
        .with_state(orchestrator)
}

#[derive(Debug, Serialize)]
pub(crate) struct JobSnapshotView {
    pub(crate) job_id: String,
    pub(crate) status: &'static str,
    pub(crate) total_requested: usize,
    pub(crate) processed: usize,
    pub(crate) as_of: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fault: Option<String>,
    pub(crate) results: Vec<ItemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<JobSummary>,
}

impl JobSnapshotView {
    fn from_job(job: &BulkJob) -> Self {
        Self {
            job_id: job.id.0.clone(),
            status: job.status.label(),
            total_requested: job.total_requested(),
            processed: job.processed(),
            as_of: job.as_of,
            fault: job.fault.clone(),
            results: job.results().cloned().collect(),
            summary: job.summary,
        }
    }
}

pub(crate) async fn submit_handler<D, G, S>(
    State(orchestrator): State<Arc<BulkVerificationOrchestrator<D, G, S>>>,
    body: String,
) -> Response
where
    D: BusinessDirectory + Send + Sync + 'static,
    G: CoordinateResolver + Send + Sync + 'static,
    S: VerificationStore + Send + Sync + 'static,
{
    let identifiers = match parse_identifiers(Cursor::new(body.into_bytes()), orchestrator.max_batch())
    {
        Ok(identifiers) => identifiers,
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let as_of = Utc::now().date_naive();
    match orchestrator.submit(identifiers, as_of) {
        Ok(job_id) => {
            orchestrator.spawn(job_id.clone());
            let payload = json!({
                "job_id": job_id.0,
                "status": "pending",
                "total_requested": orchestrator
                    .snapshot(&job_id)
                    .map(|job| job.total_requested())
                    .unwrap_or(0),
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn snapshot_handler<D, G, S>(
    State(orchestrator): State<Arc<BulkVerificationOrchestrator<D, G, S>>>,
    Path(job_id): Path<String>,
) -> Response
where
    D: BusinessDirectory + Send + Sync + 'static,
    G: CoordinateResolver + Send + Sync + 'static,
    S: VerificationStore + Send + Sync + 'static,
{
    match orchestrator.snapshot(&JobId(job_id.clone())) {
        Some(job) => {
            (StatusCode::OK, axum::Json(JobSnapshotView::from_job(&job))).into_response()
        }
        None => job_not_found(&job_id),
    }
}

pub(crate) async fn cancel_handler<D, G, S>(
    State(orchestrator): State<Arc<BulkVerificationOrchestrator<D, G, S>>>,
    Path(job_id): Path<String>,
) -> Response
where
    D: BusinessDirectory + Send + Sync + 'static,
    G: CoordinateResolver + Send + Sync + 'static,
    S: VerificationStore + Send + Sync + 'static,
{
    match orchestrator.cancel(&JobId(job_id.clone())) {
        Ok(status) => {
            let payload = json!({ "job_id": job_id, "status": status.label() });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(JobError::UnknownJob(_)) => job_not_found(&job_id),
        Err(err @ JobError::IllegalTransition { .. }) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn export_handler<D, G, S>(
    State(orchestrator): State<Arc<BulkVerificationOrchestrator<D, G, S>>>,
    Path(job_id): Path<String>,
) -> Response
where
    D: BusinessDirectory + Send + Sync + 'static,
    G: CoordinateResolver + Send + Sync + 'static,
    S: VerificationStore + Send + Sync + 'static,
{
    let Some(job) = orchestrator.snapshot(&JobId(job_id.clone())) else {
        return job_not_found(&job_id);
    };
    match export_csv(&job) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            csv,
        )
            .into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn job_not_found(job_id: &str) -> Response {
    let payload = json!({ "error": "job not found", "job_id": job_id });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}
