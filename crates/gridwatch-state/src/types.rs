//! Job, period and location timeline types.

use crate::aggregate::{concurrent_jobs, current_utilization};
use chrono::{DateTime, Duration, Utc};
use gridwatch_core::LocationData;
use serde::{Deserialize, Serialize};

/// Job lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Submitted, waiting for a location
    Pending,
    /// Scheduled at a location
    Assigned,
    /// Finished successfully
    Completed,
    /// Failed
    Failed,
    /// Missing or unrecognised status
    Unknown,
}

impl JobStatus {
    /// Parse a backend status string. Returns None for unrecognised values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "ASSIGNED" => Some(Self::Assigned),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Assigned => "ASSIGNED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Pending => "○",
            Self::Assigned => "◐",
            Self::Completed => "✓",
            Self::Failed => "✗",
            Self::Unknown => "?",
        }
    }
}

/// A validated job with its end time resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_hrs: f64,
    /// 1 (lowest) to 5 (highest)
    pub priority: Option<u8>,
    pub status: JobStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub must_start_by: Option<DateTime<Utc>>,
}

/// Grid signals attached to every period of a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSignals {
    /// gCO2/kWh
    pub carbon_intensity: f64,
    /// Percent renewable
    pub renewable_mix: f64,
    pub available_capacity: Option<f64>,
    pub price: Option<f64>,
    pub price_source: Option<String>,
}

impl From<&LocationData> for LocationSignals {
    fn from(data: &LocationData) -> Self {
        Self {
            carbon_intensity: data.carbon_intensity.unwrap_or(0.0),
            renewable_mix: data.renewable_mix.unwrap_or(0.0),
            available_capacity: data.available_capacity,
            price: data.price,
            price_source: data.price_source.clone(),
        }
    }
}

/// A time-bounded, location-scoped unit derived from exactly one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Always 100: a period only exists while a job occupies the slot
    pub utilization: u8,
    pub carbon_intensity: f64,
    pub renewable_mix: f64,
    pub active_jobs: Vec<String>,
    pub priority: Option<u8>,
    pub status: JobStatus,
    pub duration_hrs: f64,
    pub submitted_at: Option<DateTime<Utc>>,
    pub must_start_by: Option<DateTime<Utc>>,
}

impl Period {
    pub fn from_job(job: Job, signals: &LocationSignals) -> Self {
        Self {
            start: job.start,
            end: job.end,
            utilization: 100,
            carbon_intensity: signals.carbon_intensity,
            renewable_mix: signals.renewable_mix,
            active_jobs: vec![job.job_id],
            priority: job.priority,
            status: job.status,
            duration_hrs: job.duration_hrs,
            submitted_at: job.submitted_at,
            must_start_by: job.must_start_by,
        }
    }

    /// Whether the period covers `now` (inclusive on both ends).
    pub fn covers(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The job backing this period.
    pub fn job_id(&self) -> Option<&str> {
        self.active_jobs.first().map(|s| s.as_str())
    }
}

/// All periods of one location plus its current state.
///
/// Rebuilt from scratch on every successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationTimeline {
    /// Assigned grid location, or the agent name when unassigned
    pub location: String,
    pub region: String,
    pub agent_name: String,
    pub signals: LocationSignals,
    /// Ordered by start, stable on ties
    pub periods: Vec<Period>,
    /// 0 or 100
    pub current_utilization: u8,
    /// Number of periods covering the computation instant
    pub concurrent_jobs: usize,
}

impl LocationTimeline {
    /// Utilization at `now`.
    ///
    /// Equals `current_utilization` at the poll instant but follows the clock
    /// afterwards, so it stays right after a clock step.
    pub fn utilization_at(&self, now: DateTime<Utc>) -> u8 {
        current_utilization(&self.periods, now)
    }

    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.utilization_at(now) == 0
    }

    /// More than one job covers `now` at this location.
    pub fn is_oversubscribed_at(&self, now: DateTime<Utc>) -> bool {
        concurrent_jobs(&self.periods, now) > 1
    }

    /// Mean carbon intensity over periods, 0 when there are none.
    pub fn average_carbon(&self) -> f64 {
        mean(self.periods.iter().map(|p| p.carbon_intensity))
    }

    /// Mean renewable mix over periods, 0 when there are none.
    pub fn average_renewable(&self) -> f64 {
        mean(self.periods.iter().map(|p| p.renewable_mix))
    }

    /// Jobs across all periods, in or out of the window.
    pub fn total_jobs(&self) -> usize {
        self.periods.iter().map(|p| p.active_jobs.len()).sum()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Network-wide counts derived from every location's current state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub total_locations: usize,
    pub available_now: usize,
    pub busy_now: usize,
    /// Mean of `current_utilization`, 0 for an empty network
    pub average_utilization: f64,
    pub total_jobs: usize,
    pub live_jobs: usize,
    pub scheduled_jobs: usize,
    pub oversubscribed: usize,
}
