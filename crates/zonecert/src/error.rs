use crate::bulk::intake::BatchValidationError;
use crate::bulk::job::JobError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::verification::service::VerificationError;
use crate::zones::index::ZoneDataError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Batch(BatchValidationError),
    Job(JobError),
    Verification(VerificationError),
    ZoneData(ZoneDataError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Batch(err) => write!(f, "batch validation error: {}", err),
            AppError::Job(err) => write!(f, "job error: {}", err),
            AppError::Verification(err) => write!(f, "verification error: {}", err),
            AppError::ZoneData(err) => write!(f, "zone data error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Batch(err) => Some(err),
            AppError::Job(err) => Some(err),
            AppError::Verification(err) => Some(err),
            AppError::ZoneData(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Batch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Job(JobError::UnknownJob(_)) => StatusCode::NOT_FOUND,
            AppError::Job(JobError::IllegalTransition { .. }) => StatusCode::CONFLICT,
            AppError::Verification(VerificationError::UnknownBusiness(_)) => StatusCode::NOT_FOUND,
            AppError::Verification(
                VerificationError::Geocode(_) | VerificationError::Directory(_),
            ) => StatusCode::BAD_GATEWAY,
            AppError::Verification(VerificationError::Store(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::ZoneData(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<BatchValidationError> for AppError {
    fn from(value: BatchValidationError) -> Self {
        Self::Batch(value)
    }
}

impl From<JobError> for AppError {
    fn from(value: JobError) -> Self {
        Self::Job(value)
    }
}

impl From<VerificationError> for AppError {
    fn from(value: VerificationError) -> Self {
        Self::Verification(value)
    }
}

impl From<ZoneDataError> for AppError {
    fn from(value: ZoneDataError) -> Self {
        Self::ZoneData(value)
    }
}
