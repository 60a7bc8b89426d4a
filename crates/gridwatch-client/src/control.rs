//! Simulation clock control

use crate::GridClient;
use crate::error::{ClientError, Result};
use chrono::{DateTime, Utc};
use gridwatch_core::ClockReport;
use gridwatch_parsers::parse_timestamp;
use tracing::info;

impl GridClient {
    /// `GET /control/time`
    pub async fn get_time(&self) -> Result<DateTime<Utc>> {
        let response = self.client.get(self.url("/control/time")).send().await?;
        let report: ClockReport = self.handle_response(response).await?;
        parse_clock(&report)
    }

    /// `POST` to one of the step endpoints.
    pub(crate) async fn post_step(&self, path: &str) -> Result<DateTime<Utc>> {
        let response = self.client.post(self.url(path)).send().await?;
        let report: ClockReport = self.handle_response(response).await?;
        let time = parse_clock(&report)?;
        info!("Simulation clock now {}", time);
        Ok(time)
    }
}

fn parse_clock(report: &ClockReport) -> Result<DateTime<Utc>> {
    parse_timestamp(&report.simulation_time)
        .map_err(|_| ClientError::InvalidTimestamp(report.simulation_time.clone()))
}
