//! Bulk verification: batch intake, the job state machine, and the
//! bounded-concurrency orchestrator.

pub mod board;
pub mod export;
pub mod intake;
pub mod job;
pub mod orchestrator;
pub mod router;

pub use board::{JobBoard, JobProgress};
pub use export::export_csv;
pub use intake::{parse_identifiers, resolve_identifier_column, BatchValidationError, ColumnResolution};
pub use job::{BulkJob, ItemOutcome, ItemResult, JobError, JobId, JobStatus, JobSummary};
pub use orchestrator::BulkVerificationOrchestrator;
pub use router::bulk_router;
