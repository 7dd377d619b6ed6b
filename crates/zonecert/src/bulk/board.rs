use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::Serialize;

use super::job::{BulkJob, ItemResult, JobError, JobId, JobStatus};
use crate::verification::domain::BusinessId;

/// Serialized access to every live job. One mutex keeps state transitions
/// and progress counters atomic across concurrently completing workers.
#[derive(Default)]
pub struct JobBoard {
    jobs: Mutex<HashMap<JobId, BulkJob>>,
}

/// Lightweight progress view for polling.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JobProgress {
    pub status: JobStatus,
    pub total: usize,
    pub processed: usize,
}

impl JobBoard {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<JobId, BulkJob>> {
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self, requested: Vec<BusinessId>, as_of: NaiveDate) -> JobId {
        let job = BulkJob::new(requested, as_of);
        let id = job.id.clone();
        self.lock().insert(id.clone(), job);
        id
    }

    /// Move a pending job into processing and hand back its work list.
    pub fn begin(&self, job_id: &JobId) -> Result<(Vec<BusinessId>, NaiveDate), JobError> {
        let mut jobs = self.lock();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::UnknownJob(job_id.0.clone()))?;
        job.transition(JobStatus::Processing)?;
        Ok((job.requested.clone(), job.as_of))
    }

    /// Record a per-item result; silently dropped once the job is terminal.
    pub fn record(&self, job_id: &JobId, index: usize, result: ItemResult) {
        if let Some(job) = self.lock().get_mut(job_id) {
            job.record(index, result);
        }
    }

    /// Complete a processing job and fold its summary. A job that was
    /// cancelled or failed in the meantime is left untouched.
    pub fn complete(&self, job_id: &JobId) -> Result<(), JobError> {
        let mut jobs = self.lock();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::UnknownJob(job_id.0.clone()))?;
        if job.status != JobStatus::Processing {
            return Ok(());
        }
        job.transition(JobStatus::Completed)?;
        job.finalize_summary();
        Ok(())
    }

    /// Fail a job on an orchestration-level fault, keeping any per-item
    /// results already recorded.
    pub fn fail(&self, job_id: &JobId, message: String) -> Result<(), JobError> {
        let mut jobs = self.lock();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::UnknownJob(job_id.0.clone()))?;
        if job.status.is_terminal() {
            return Ok(());
        }
        if job.status == JobStatus::Pending {
            job.transition(JobStatus::Processing)?;
        }
        job.transition(JobStatus::Failed)?;
        job.fault = Some(message);
        job.finalize_summary();
        Ok(())
    }

    /// Cooperative cancellation: stops further dispatch, keeps produced
    /// results. Errors when the job is already terminal.
    pub fn cancel(&self, job_id: &JobId) -> Result<JobStatus, JobError> {
        let mut jobs = self.lock();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::UnknownJob(job_id.0.clone()))?;
        job.transition(JobStatus::Cancelled)?;
        job.finalize_summary();
        Ok(job.status)
    }

    pub fn is_cancelled(&self, job_id: &JobId) -> bool {
        self.lock()
            .get(job_id)
            .map(|job| job.status == JobStatus::Cancelled)
            .unwrap_or(true)
    }

    pub fn progress(&self, job_id: &JobId) -> Option<JobProgress> {
        self.lock().get(job_id).map(|job| JobProgress {
            status: job.status,
            total: job.total_requested(),
            processed: job.processed(),
        })
    }

    pub fn snapshot(&self, job_id: &JobId) -> Option<BulkJob> {
        self.lock().get(job_id).cloned()
    }
}
