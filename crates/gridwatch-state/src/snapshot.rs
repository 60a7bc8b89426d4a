//! Per-view snapshots produced by one successful poll.

use crate::aggregate::{RegionSummary, summarize, summarize_regions};
use crate::normalize::DataQuality;
use crate::timeline::build_timelines;
use crate::types::{LocationTimeline, NetworkSummary};
use crate::window::{Projection, project_periods};
use chrono::{DateTime, Utc};
use gridwatch_core::{AgentRecord, LogEntry};
use gridwatch_parsers::parse_timestamp;
use serde::Serialize;

/// Everything the timeline view renders.
///
/// Built in one synchronous pass from a fetched payload and never modified
/// afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimelineSnapshot {
    pub timelines: Vec<LocationTimeline>,
    pub summary: NetworkSummary,
    pub quality: DataQuality,
    /// Clock value the utilization figures were computed for
    pub computed_for: Option<DateTime<Utc>>,
}

impl TimelineSnapshot {
    pub fn build(agents: &[AgentRecord], now: DateTime<Utc>) -> Self {
        let (timelines, quality) = build_timelines(agents, now);
        let summary = summarize(&timelines, now);
        Self {
            timelines,
            summary,
            quality,
            computed_for: Some(now),
        }
    }

    /// Window placement of every period, location by location.
    ///
    /// Called per render tick with the current clock; nothing is cached.
    pub fn project(&self, now: DateTime<Utc>) -> Vec<Vec<Projection>> {
        self.timelines
            .iter()
            .map(|t| project_periods(&t.periods, now))
            .collect()
    }

    /// Network counts at `now`.
    ///
    /// `summary` is fixed at poll time; renderers use this so the counts
    /// match the lanes they draw for the same clock value.
    pub fn summary_at(&self, now: DateTime<Utc>) -> NetworkSummary {
        summarize(&self.timelines, now)
    }

    pub fn regions(&self, now: DateTime<Utc>) -> Vec<RegionSummary> {
        summarize_regions(&self.timelines, now)
    }
}

/// One system event log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogLine {
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
}

impl From<&LogEntry> for LogLine {
    fn from(entry: &LogEntry) -> Self {
        Self {
            timestamp: entry.timestamp().and_then(|s| parse_timestamp(s).ok()),
            message: entry.message().to_string(),
        }
    }
}

/// Everything the dashboard view renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub network: TimelineSnapshot,
    /// Most recent last
    pub logs: Vec<LogLine>,
}

impl DashboardSnapshot {
    /// Log lines kept per snapshot.
    pub const MAX_LOGS: usize = 200;

    pub fn build(agents: &[AgentRecord], logs: &[LogEntry], now: DateTime<Utc>) -> Self {
        let network = TimelineSnapshot::build(agents, now);
        let skip = logs.len().saturating_sub(Self::MAX_LOGS);
        Self {
            network,
            logs: logs.iter().skip(skip).map(LogLine::from).collect(),
        }
    }
}
