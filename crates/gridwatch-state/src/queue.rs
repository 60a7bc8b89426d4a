//! The compute job submission queue.

use crate::types::JobStatus;
use gridwatch_core::{ComputeJob, JobsReport};
use gridwatch_parsers::non_empty_string;
use serde::Serialize;

/// One submitted job as the jobs view shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedJob {
    pub job_id: String,
    pub status: JobStatus,
    pub runtime_hrs: Option<f64>,
    /// 1 (lowest) to 5 (highest)
    pub priority: Option<u8>,
}

impl QueuedJob {
    fn from_wire(index: usize, job: &ComputeJob) -> Self {
        Self {
            job_id: job
                .job_id
                .as_deref()
                .and_then(non_empty_string)
                .unwrap_or_else(|| format!("job-{index}")),
            status: job
                .status
                .as_deref()
                .and_then(JobStatus::parse)
                .unwrap_or(JobStatus::Unknown),
            runtime_hrs: job
                .estimated_runtime_hrs
                .filter(|hours| hours.is_finite() && *hours >= 0.0),
            priority: job.priority.map(|p| p.clamp(1, 5) as u8),
        }
    }
}

/// Everything the jobs view renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobQueueSnapshot {
    /// In submission order
    pub jobs: Vec<QueuedJob>,
}

impl JobQueueSnapshot {
    pub fn build(report: &JobsReport) -> Self {
        Self {
            jobs: report
                .jobs
                .iter()
                .enumerate()
                .map(|(index, job)| QueuedJob::from_wire(index, job))
                .collect(),
        }
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|job| job.status == status).count()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
