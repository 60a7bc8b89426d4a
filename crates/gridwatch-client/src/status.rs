//! Read-only status endpoints

use crate::GridClient;
use crate::error::Result;
use gridwatch_core::{DiscoveryReport, JobsReport, StatusReport};
use tracing::debug;

impl GridClient {
    /// `GET /status`
    pub async fn get_status(&self) -> Result<StatusReport> {
        let response = self.client.get(self.url("/status")).send().await?;
        let report: StatusReport = self.handle_response(response).await?;
        debug!(
            "status: {} agents, {} log entries",
            report.agents.len(),
            report.logs.len()
        );
        Ok(report)
    }

    /// `GET /discovery/status`
    pub async fn get_discovery_status(&self) -> Result<DiscoveryReport> {
        let response = self.client.get(self.url("/discovery/status")).send().await?;
        let report: DiscoveryReport = self.handle_response(response).await?;
        debug!("discovery status: {} agents", report.agents.len());
        Ok(report)
    }

    /// `GET /jobs`
    pub async fn get_jobs(&self) -> Result<JobsReport> {
        let response = self.client.get(self.url("/jobs")).send().await?;
        let report: JobsReport = self.handle_response(response).await?;
        debug!("jobs: {} queued", report.jobs.len());
        Ok(report)
    }
}
