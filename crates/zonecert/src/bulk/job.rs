use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::verification::domain::{BusinessId, RiskLevel, VerificationId, VerificationStatus};
use crate::verification::store::Verification;

/// Identifier wrapper for bulk jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Orchestration-level faults and illegal lifecycle moves.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job {0} not found")]
    UnknownJob(String),
    #[error("illegal job transition {from} -> {to}")]
    IllegalTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Outcome of one identifier within a batch. Not-found and non-compliant
/// are normal completed items, never job failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Compliant,
    NonCompliant,
    Expired,
    NotFound,
    Error,
}

impl ItemOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            ItemOutcome::Compliant => "compliant",
            ItemOutcome::NonCompliant => "non_compliant",
            ItemOutcome::Expired => "expired",
            ItemOutcome::NotFound => "not_found",
            ItemOutcome::Error => "error",
        }
    }
}

/// Per-identifier result captured by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub business_id: BusinessId,
    pub business_name: Option<String>,
    pub outcome: ItemOutcome,
    pub risk_level: Option<RiskLevel>,
    pub risk_score: Option<u8>,
    pub verification_id: Option<VerificationId>,
    pub retryable: bool,
    pub error: Option<String>,
}

impl ItemResult {
    pub fn from_verification(record: &Verification) -> Self {
        let outcome = match record.status {
            VerificationStatus::Compliant => ItemOutcome::Compliant,
            VerificationStatus::NonCompliant => ItemOutcome::NonCompliant,
            VerificationStatus::Expired => ItemOutcome::Expired,
        };
        Self {
            business_id: record.business_id.clone(),
            business_name: Some(record.business_name.clone()),
            outcome,
            risk_level: Some(record.risk_level),
            risk_score: Some(record.risk_score),
            verification_id: Some(record.id.clone()),
            retryable: false,
            error: None,
        }
    }

    pub fn not_found(business_id: BusinessId) -> Self {
        Self {
            business_id,
            business_name: None,
            outcome: ItemOutcome::NotFound,
            risk_level: None,
            risk_score: None,
            verification_id: None,
            retryable: false,
            error: None,
        }
    }

    pub fn error(business_id: BusinessId, retryable: bool, message: String) -> Self {
        Self {
            business_id,
            business_name: None,
            outcome: ItemOutcome::Error,
            risk_level: None,
            risk_score: None,
            verification_id: None,
            retryable,
            error: Some(message),
        }
    }
}

/// Fraction of requested items that may fail retryably before the summary
/// carries a degraded-job warning.
pub const DEGRADED_ERROR_RATIO: f64 = 0.25;

/// Final counts, computed only by folding over the stored per-item results
/// so the summary can never drift from the item data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub compliant: usize,
    pub non_compliant: usize,
    pub expired: usize,
    pub not_found: usize,
    pub errors: usize,
    pub degraded: bool,
}

impl JobSummary {
    pub fn fold<'a, I>(results: I, total_requested: usize) -> Self
    where
        I: IntoIterator<Item = &'a ItemResult>,
    {
        let mut summary = Self::default();
        let mut retryable_errors = 0usize;
        for result in results {
            match result.outcome {
                ItemOutcome::Compliant => summary.compliant += 1,
                ItemOutcome::NonCompliant => summary.non_compliant += 1,
                ItemOutcome::Expired => summary.expired += 1,
                ItemOutcome::NotFound => summary.not_found += 1,
                ItemOutcome::Error => {
                    summary.errors += 1;
                    if result.retryable {
                        retryable_errors += 1;
                    }
                }
            }
        }
        if total_requested > 0 {
            let ratio = retryable_errors as f64 / total_requested as f64;
            summary.degraded = ratio >= DEGRADED_ERROR_RATIO;
        }
        summary
    }
}

/// A bulk verification job: validated identifier list, per-item result
/// slots, and an explicit state machine. All mutation goes through the
/// transition and record methods; terminal states accept nothing further.
#[derive(Debug, Clone)]
pub struct BulkJob {
    pub id: JobId,
    pub status: JobStatus,
    pub requested: Vec<BusinessId>,
    pub as_of: NaiveDate,
    items: Vec<Option<ItemResult>>,
    processed: usize,
    pub summary: Option<JobSummary>,
    pub fault: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BulkJob {
    pub fn new(requested: Vec<BusinessId>, as_of: NaiveDate) -> Self {
        let items = vec![None; requested.len()];
        Self {
            id: next_job_id(),
            status: JobStatus::Pending,
            requested,
            as_of,
            items,
            processed: 0,
            summary: None,
            fault: None,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn total_requested(&self) -> usize {
        self.requested.len()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn results(&self) -> impl Iterator<Item = &ItemResult> {
        self.items.iter().flatten()
    }

    /// Result for each requested identifier in submission order, `None`
    /// where the item was never dispatched (cancelled or failed jobs).
    pub fn result_slots(&self) -> &[Option<ItemResult>] {
        &self.items
    }

    pub fn transition(&mut self, next: JobStatus) -> Result<(), JobError> {
        let legal = matches!(
            (self.status, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Pending, JobStatus::Cancelled)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
                | (JobStatus::Processing, JobStatus::Cancelled)
        );
        if !legal {
            return Err(JobError::IllegalTransition {
                from: self.status.label(),
                to: next.label(),
            });
        }
        self.status = next;
        match next {
            JobStatus::Processing => self.started_at = Some(Utc::now()),
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => {
                self.finished_at = Some(Utc::now())
            }
            JobStatus::Pending => {}
        }
        Ok(())
    }

    /// Record one item result. Returns false (dropping the result) once the
    /// job is terminal; the processed counter only ever increases.
    pub fn record(&mut self, index: usize, result: ItemResult) -> bool {
        if self.status.is_terminal() || index >= self.items.len() {
            return false;
        }
        if self.items[index].is_none() {
            self.processed += 1;
        }
        self.items[index] = Some(result);
        true
    }

    pub fn all_items_resolved(&self) -> bool {
        self.processed == self.items.len()
    }

    /// Fold the stored per-item results into the summary.
    pub fn finalize_summary(&mut self) {
        self.summary = Some(JobSummary::fold(self.results(), self.total_requested()));
    }
}
