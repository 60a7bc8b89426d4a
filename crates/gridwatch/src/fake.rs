//! In-memory backend for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gridwatch_client::{ClientError, Result, StatusSource};
use gridwatch_core::{DiscoveryReport, JobsReport, StatusReport};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned reports and counts calls per endpoint.
///
/// Without a clock time set, the clock endpoints fail like a backend that
/// does not expose them.
#[derive(Default)]
pub struct FakeSource {
    pub status: Mutex<StatusReport>,
    pub discovery: Mutex<DiscoveryReport>,
    pub jobs: Mutex<JobsReport>,
    clock: Mutex<Option<DateTime<Utc>>>,
    pub status_calls: AtomicUsize,
    pub discovery_calls: AtomicUsize,
    pub jobs_calls: AtomicUsize,
}

impl FakeSource {
    pub fn set_clock(&self, time: Option<DateTime<Utc>>) {
        *self.clock.lock().unwrap() = time;
    }

    fn clock_time(&self) -> Result<DateTime<Utc>> {
        self.clock
            .lock()
            .unwrap()
            .ok_or_else(|| ClientError::api_error(404, "Not Found"))
    }
}

#[async_trait]
impl StatusSource for FakeSource {
    async fn status(&self) -> Result<StatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.status.lock().unwrap().clone())
    }

    async fn discovery_status(&self) -> Result<DiscoveryReport> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.discovery.lock().unwrap().clone())
    }

    async fn jobs(&self) -> Result<JobsReport> {
        self.jobs_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn simulation_time(&self) -> Result<DateTime<Utc>> {
        self.clock_time()
    }

    async fn step_forward(&self) -> Result<DateTime<Utc>> {
        self.clock_time()
    }

    async fn step_backward(&self) -> Result<DateTime<Utc>> {
        self.clock_time()
    }
}
