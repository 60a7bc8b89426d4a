//! Discovery activity per agent.

use chrono::{DateTime, Utc};
use gridwatch_core::{AgentRecord, DiscoveryReport};
use gridwatch_parsers::parse_timestamp;
use serde::Serialize;
use serde_json::Value;

/// Aggregated view of one discovery catalog response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub providers: usize,
    pub total_items: usize,
    /// Rounded mean over items that carry grid parameters
    pub average_carbon: f64,
    pub average_renewable: f64,
}

impl CatalogSummary {
    /// Summarize a catalog response (`message.catalogs[].beckn:items[]`).
    ///
    /// Anything that does not have the expected shape counts as empty.
    pub fn from_result(result: &Value) -> Self {
        let catalogs = result
            .pointer("/message/catalogs")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut summary = Self {
            providers: catalogs.len(),
            ..Default::default()
        };

        let mut carbon = 0.0;
        let mut renewable = 0.0;
        let mut with_params = 0usize;

        for catalog in catalogs {
            let items = catalog
                .get("beckn:items")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            summary.total_items += items.len();

            for item in items {
                let Some(params) = item
                    .get("beckn:itemAttributes")
                    .and_then(|attrs| attrs.get("beckn:gridParameters"))
                else {
                    continue;
                };
                carbon += params.get("carbonIntensity").and_then(Value::as_f64).unwrap_or(0.0);
                renewable += params.get("renewableMix").and_then(Value::as_f64).unwrap_or(0.0);
                with_params += 1;
            }
        }

        if with_params > 0 {
            summary.average_carbon = (carbon / with_params as f64).round();
            summary.average_renewable = (renewable / with_params as f64).round();
        }
        summary
    }
}

/// Discovery state of one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDiscovery {
    pub agent_name: String,
    pub region: String,
    pub assigned_location: Option<String>,
    pub discovery_count: u64,
    pub last_discovery: Option<DateTime<Utc>>,
    /// Cities queried, most recent last
    pub cities: Vec<String>,
    pub locations_found: usize,
    /// Summary of the most recent catalog response
    pub latest_catalog: Option<CatalogSummary>,
}

impl From<&AgentRecord> for AgentDiscovery {
    fn from(agent: &AgentRecord) -> Self {
        let history = &agent.discovery_history;
        let last_discovery = agent
            .last_discovery_time
            .as_deref()
            .and_then(|s| parse_timestamp(s).ok())
            .or_else(|| {
                history
                    .iter()
                    .filter_map(|r| r.timestamp.as_deref())
                    .filter_map(|s| parse_timestamp(s).ok())
                    .max()
            });

        Self {
            agent_name: agent.agent_name.clone(),
            region: agent.region.clone(),
            assigned_location: agent.assigned_location.clone(),
            discovery_count: agent.discovery_count.unwrap_or(history.len() as u64),
            last_discovery,
            cities: history.iter().map(|r| r.city.clone()).collect(),
            locations_found: history.iter().map(|r| r.discovered_locations.len()).sum(),
            latest_catalog: history.last().map(|r| CatalogSummary::from_result(&r.result)),
        }
    }
}

/// Everything the discovery view renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoverySnapshot {
    pub total_agents: usize,
    pub agents: Vec<AgentDiscovery>,
}

impl DiscoverySnapshot {
    pub fn build(report: &DiscoveryReport) -> Self {
        Self {
            total_agents: report
                .total_agents
                .map(|n| n as usize)
                .unwrap_or(report.agents.len()),
            agents: report.agents.iter().map(AgentDiscovery::from).collect(),
        }
    }

    /// Discoveries across all agents.
    pub fn total_discoveries(&self) -> u64 {
        self.agents.iter().map(|a| a.discovery_count).sum()
    }

    /// Agents that have run at least one discovery.
    pub fn active_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.discovery_count > 0).count()
    }
}
