use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::board::{JobBoard, JobProgress};
use super::intake::BatchValidationError;
use super::job::{BulkJob, ItemResult, JobError, JobId, JobStatus};
use crate::config::BulkConfig;
use crate::verification::domain::{BusinessId, TriggeredBy};
use crate::verification::service::{VerificationError, VerificationService};
use crate::verification::store::{BusinessDirectory, CoordinateResolver, VerificationStore};

/// Drives verification across a batch of identifiers with a bounded worker
/// pool, cooperative cancellation, and partial-result semantics: every
/// submitted identifier ends with a result unless the job is cancelled or
/// faulted first.
pub struct BulkVerificationOrchestrator<D, G, S> {
    service: Arc<VerificationService<D, G, S>>,
    board: Arc<JobBoard>,
    config: BulkConfig,
}

enum WorkerOutcome {
    Item(usize, ItemResult),
    /// Storage-level fault; fails the whole job.
    Fault(usize, String),
}

impl<D, G, S> BulkVerificationOrchestrator<D, G, S>
where
    D: BusinessDirectory + Send + Sync + 'static,
    G: CoordinateResolver + Send + Sync + 'static,
    S: VerificationStore + Send + Sync + 'static,
{
    pub fn new(
        service: Arc<VerificationService<D, G, S>>,
        board: Arc<JobBoard>,
        config: BulkConfig,
    ) -> Self {
        Self {
            service,
            board,
            config,
        }
    }

    pub fn board(&self) -> &Arc<JobBoard> {
        &self.board
    }

    pub fn max_batch(&self) -> usize {
        self.config.max_batch
    }

    /// Validate and register a batch. Identifiers are deduplicated in
    /// first-seen order; empty and oversized batches never become jobs.
    pub fn submit(
        &self,
        identifiers: Vec<BusinessId>,
        as_of: NaiveDate,
    ) -> Result<JobId, BatchValidationError> {
        let mut deduplicated = Vec::with_capacity(identifiers.len());
        let mut seen = std::collections::HashSet::new();
        for id in identifiers {
            if seen.insert(id.clone()) {
                deduplicated.push(id);
            }
        }

        if deduplicated.is_empty() {
            return Err(BatchValidationError::EmptyBatch);
        }
        if deduplicated.len() > self.config.max_batch {
            return Err(BatchValidationError::BatchTooLarge {
                count: deduplicated.len(),
                max: self.config.max_batch,
            });
        }

        let job_id = self.board.create(deduplicated, as_of);
        info!(job = %job_id.0, "bulk verification job accepted");
        Ok(job_id)
    }

    /// Run a pending job to its terminal state.
    pub async fn run(&self, job_id: &JobId) -> Result<JobStatus, JobError> {
        let (identifiers, as_of) = self.board.begin(job_id)?;
        let total = identifiers.len();
        info!(job = %job_id.0, total, "bulk verification started");

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let faulted = Arc::new(AtomicBool::new(false));
        let mut workers: JoinSet<WorkerOutcome> = JoinSet::new();

        for (index, business_id) in identifiers.into_iter().enumerate() {
            // Cooperative cancellation and fault stop: checked before each
            // dispatch; in-flight items are left to finish.
            if self.board.is_cancelled(job_id) || faulted.load(Ordering::Acquire) {
                break;
            }
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let service = self.service.clone();
            let board = self.board.clone();
            let job = job_id.clone();
            let faulted = faulted.clone();
            workers.spawn(async move {
                let _permit = permit;
                let triggered_by = TriggeredBy::BulkJob(job.0.clone());
                let outcome =
                    match service.verify(&business_id, as_of, triggered_by) {
                        Ok(record) => {
                            WorkerOutcome::Item(index, ItemResult::from_verification(&record))
                        }
                        Err(VerificationError::UnknownBusiness(id)) => {
                            WorkerOutcome::Item(index, ItemResult::not_found(id))
                        }
                        Err(VerificationError::Store(err)) => {
                            faulted.store(true, Ordering::Release);
                            WorkerOutcome::Fault(index, err.to_string())
                        }
                        Err(err) => WorkerOutcome::Item(
                            index,
                            ItemResult::error(business_id, err.is_retryable(), err.to_string()),
                        ),
                    };
                if let WorkerOutcome::Item(index, result) = &outcome {
                    debug!(job = %job.0, item = index, outcome = result.outcome.label(), "item finished");
                    board.record(&job, *index, result.clone());
                }
                outcome
            });
        }

        let mut fault_message = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(WorkerOutcome::Fault(index, message)) => {
                    warn!(job = %job_id.0, item = index, error = %message, "job-level fault");
                    fault_message.get_or_insert(message);
                }
                Ok(WorkerOutcome::Item(..)) => {}
                Err(join_error) => {
                    warn!(job = %job_id.0, error = %join_error, "worker panicked");
                    fault_message.get_or_insert_with(|| join_error.to_string());
                }
            }
        }

        if let Some(message) = fault_message {
            self.board.fail(job_id, message)?;
        } else {
            // Leaves a cancelled job untouched.
            self.board.complete(job_id)?;
        }

        let progress = self
            .board
            .progress(job_id)
            .ok_or_else(|| JobError::UnknownJob(job_id.0.clone()))?;
        let snapshot = self.board.snapshot(job_id);
        if let Some(summary) = snapshot.and_then(|job| job.summary) {
            if summary.degraded {
                warn!(
                    job = %job_id.0,
                    errors = summary.errors,
                    "bulk job degraded by repeated dependency errors"
                );
            }
        }
        info!(
            job = %job_id.0,
            status = progress.status.label(),
            processed = progress.processed,
            total = progress.total,
            "bulk verification finished"
        );
        Ok(progress.status)
    }

    /// Fire-and-forget execution for HTTP submission; progress is polled
    /// through the board.
    pub fn spawn(self: &Arc<Self>, job_id: JobId) {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            if let Err(err) = orchestrator.run(&job_id).await {
                warn!(job = %job_id.0, error = %err, "bulk job could not run");
            }
        });
    }

    pub fn progress(&self, job_id: &JobId) -> Option<JobProgress> {
        self.board.progress(job_id)
    }

    pub fn snapshot(&self, job_id: &JobId) -> Option<BulkJob> {
        self.board.snapshot(job_id)
    }

    pub fn cancel(&self, job_id: &JobId) -> Result<JobStatus, JobError> {
        let status = self.board.cancel(job_id)?;
        info!(job = %job_id.0, "bulk verification cancelled");
        Ok(status)
    }
}
