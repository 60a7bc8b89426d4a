//! Build location timelines from agent records.

use crate::aggregate::{concurrent_jobs, current_utilization};
use crate::normalize::{DataQuality, normalize_schedule};
use crate::types::{LocationSignals, LocationTimeline};
use chrono::{DateTime, Utc};
use gridwatch_core::AgentRecord;
use gridwatch_parsers::non_empty_string;

/// Materialize one agent's schedule as a location timeline.
pub fn build_timeline(
    agent: &AgentRecord,
    now: DateTime<Utc>,
    quality: &mut DataQuality,
) -> LocationTimeline {
    let location = agent
        .assigned_location
        .as_deref()
        .and_then(non_empty_string)
        .unwrap_or_else(|| agent.agent_name.clone());

    let signals = agent
        .location_data
        .as_ref()
        .map(LocationSignals::from)
        .unwrap_or_default();

    let periods = normalize_schedule(&location, &agent.job_schedule, &signals, now, quality);

    LocationTimeline {
        current_utilization: current_utilization(&periods, now),
        concurrent_jobs: concurrent_jobs(&periods, now),
        location,
        region: agent.region.clone(),
        agent_name: agent.agent_name.clone(),
        signals,
        periods,
    }
}

/// Materialize every agent, in payload order.
pub fn build_timelines(
    agents: &[AgentRecord],
    now: DateTime<Utc>,
) -> (Vec<LocationTimeline>, DataQuality) {
    let mut quality = DataQuality::default();
    let timelines = agents
        .iter()
        .map(|agent| build_timeline(agent, now, &mut quality))
        .collect();
    (timelines, quality)
}

/// Distinct regions in order of first appearance.
pub fn regions(timelines: &[LocationTimeline]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for timeline in timelines {
        if !seen.contains(&timeline.region) {
            seen.push(timeline.region.clone());
        }
    }
    seen
}

/// Locations in `region`, or all of them when no region is selected.
pub fn filter_region<'a>(
    timelines: &'a [LocationTimeline],
    region: Option<&str>,
) -> Vec<&'a LocationTimeline> {
    timelines
        .iter()
        .filter(|t| region.is_none_or(|r| t.region == r))
        .collect()
}
