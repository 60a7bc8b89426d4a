//! HTTP client for the grid agent backend.
//!
//! Wraps the status, discovery, job queue and clock-control endpoints behind
//! the [`StatusSource`] trait so polling code can be driven by an in-memory
//! source in tests.
//!
//! # Example
//!
//! ```no_run
//! use gridwatch_client::{GridClient, StatusSource};
//!
//! # async fn example() -> gridwatch_client::Result<()> {
//! let client = GridClient::new("http://localhost:8000");
//! let status = client.status().await?;
//! println!("{} agents", status.agents.len());
//! # Ok(())
//! # }
//! ```

mod control;
pub mod error;
mod status;

pub use error::{ClientError, Result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gridwatch_core::{DiscoveryReport, JobsReport, StatusReport};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Anything that can answer the backend's read and clock requests.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Agents with their schedules plus the system event log.
    async fn status(&self) -> Result<StatusReport>;

    /// Agents with their discovery history.
    async fn discovery_status(&self) -> Result<DiscoveryReport>;

    /// Every submitted compute job with its queue status.
    async fn jobs(&self) -> Result<JobsReport>;

    /// Current simulation time.
    async fn simulation_time(&self) -> Result<DateTime<Utc>>;

    /// Advance the simulation clock one step; returns the new time.
    async fn step_forward(&self) -> Result<DateTime<Utc>>;

    /// Rewind the simulation clock one step; returns the new time.
    async fn step_backward(&self) -> Result<DateTime<Utc>>;
}

/// HTTP client for the backend API
#[derive(Debug, Clone)]
pub struct GridClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    client: Client,
}

impl GridClient {
    /// Create a client with reqwest's default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a client around a preconfigured reqwest client.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the status code and deserialize the JSON body.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[async_trait]
impl StatusSource for GridClient {
    async fn status(&self) -> Result<StatusReport> {
        self.get_status().await
    }

    async fn discovery_status(&self) -> Result<DiscoveryReport> {
        self.get_discovery_status().await
    }

    async fn jobs(&self) -> Result<JobsReport> {
        self.get_jobs().await
    }

    async fn simulation_time(&self) -> Result<DateTime<Utc>> {
        self.get_time().await
    }

    async fn step_forward(&self) -> Result<DateTime<Utc>> {
        self.post_step("/control/step_forward").await
    }

    async fn step_backward(&self) -> Result<DateTime<Utc>> {
        self.post_step("/control/step_backward").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GridClient::new("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GridClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/status"), "http://localhost:8000/status");
    }

    #[test]
    fn test_client_with_timeout() {
        let client = GridClient::with_timeout("http://localhost:8000", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_error() {
        // Port 9 on loopback has nothing listening
        let client =
            GridClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.status().await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed(_)), "{err:?}");
    }
}
