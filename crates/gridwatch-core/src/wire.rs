//! Status, discovery, job queue and clock payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// Deserialize a string field that may be null or not a string.
///
/// Numbers and booleans are stringified; null, objects and arrays become the
/// empty string.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Deserialize a list one element at a time.
///
/// Null or a non-list becomes empty. An element that does not fit `T` is
/// kept as `T::default()` so it is still counted and repaired downstream.
fn deserialize_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// Deserialize any JSON value, keeping it only if it has the expected shape.
///
/// A number where a string was expected (or vice versa) becomes `None`
/// instead of failing the enclosing record.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Response of `GET /status`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatusReport {
    #[serde(default, deserialize_with = "deserialize_records")]
    pub agents: Vec<AgentRecord>,

    #[serde(default, deserialize_with = "deserialize_records")]
    pub logs: Vec<LogEntry>,
}

/// Response of `GET /discovery/status`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscoveryReport {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub total_agents: Option<u64>,

    #[serde(default, deserialize_with = "deserialize_records")]
    pub agents: Vec<AgentRecord>,
}

/// One agent as reported by the backend.
///
/// Status and discovery endpoints share this shape; each only fills the
/// fields it knows about.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentRecord {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub agent_name: String,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub region: String,

    /// Grid location the agent is bound to, if any
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub assigned_location: Option<String>,

    /// Grid signals for the assigned location
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub location_data: Option<LocationData>,

    /// Jobs scheduled at this agent's location
    #[serde(default, deserialize_with = "deserialize_records")]
    pub job_schedule: Vec<RawJob>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub discovery_count: Option<u64>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub last_discovery_time: Option<String>,

    #[serde(default, deserialize_with = "deserialize_records")]
    pub discovery_history: Vec<DiscoveryRecord>,
}

/// Grid signals for one location.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LocationData {
    /// gCO2/kWh
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub carbon_intensity: Option<f64>,

    /// Percent of supply from renewables
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub renewable_mix: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub available_capacity: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub price_source: Option<String>,
}

/// A job record exactly as found in `job_schedule`.
///
/// Nothing is validated here; see the schedule normalizer for defaulting.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawJob {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub job_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub start_time: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub end_time: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub duration_hrs: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub priority: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub submitted_at: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub must_start_by: Option<String>,
}

/// One entry of an agent's discovery history.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscoveryRecord {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub timestamp: Option<String>,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub city: String,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub query: String,

    /// Raw catalog response from the discovery network
    #[serde(default)]
    pub result: Value,

    #[serde(default, deserialize_with = "deserialize_records")]
    pub discovered_locations: Vec<Value>,
}

/// A system event log line. Older backends send bare strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LogEntry {
    Event {
        #[serde(default)]
        timestamp: Option<String>,
        message: String,
    },
    Text(String),
    /// Any other shape; kept so one odd line cannot fail the whole log
    Other(Value),
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl LogEntry {
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::Event { message, .. } => Cow::Borrowed(message),
            Self::Text(message) => Cow::Borrowed(message),
            Self::Other(value) => {
                let text = value
                    .get("message")
                    .or_else(|| value.get("msg"))
                    .unwrap_or(value);
                match text {
                    Value::String(s) => Cow::Borrowed(s),
                    Value::Null => Cow::Borrowed(""),
                    other => Cow::Owned(other.to_string()),
                }
            }
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Self::Event { timestamp, .. } => timestamp.as_deref(),
            Self::Text(_) => None,
            Self::Other(value) => value.get("timestamp").and_then(Value::as_str),
        }
    }
}

/// Response of `GET /jobs`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JobsReport {
    #[serde(default, deserialize_with = "deserialize_records")]
    pub jobs: Vec<ComputeJob>,
}

/// A job in the submission queue, before or after placement.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComputeJob {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub job_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub estimated_runtime_hrs: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub priority: Option<i64>,
}

/// Response of the clock-control endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClockReport {
    pub simulation_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_report() {
        let json = r#"{
            "agents": [{
                "agent_name": "Manchester Node",
                "region": "North",
                "assigned_location": "Manchester",
                "location_data": {
                    "carbon_intensity": 180.5,
                    "renewable_mix": 42,
                    "available_capacity": 80,
                    "price": 0.21,
                    "price_source": "beckn"
                },
                "job_schedule": [{
                    "job_id": "a1b2c3",
                    "start_time": "2025-01-15T10:00:00",
                    "duration_hrs": 2.5,
                    "priority": 3,
                    "status": "ASSIGNED",
                    "submitted_at": "2025-01-15T09:00:00"
                }]
            }],
            "logs": ["plain line", {"timestamp": "2025-01-15T09:00:00", "message": "event"}]
        }"#;

        let report: StatusReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.agents.len(), 1);

        let agent = &report.agents[0];
        assert_eq!(agent.assigned_location.as_deref(), Some("Manchester"));
        let location = agent.location_data.as_ref().unwrap();
        assert_eq!(location.renewable_mix, Some(42.0));
        assert_eq!(location.price_source.as_deref(), Some("beckn"));

        let job = &agent.job_schedule[0];
        assert_eq!(job.job_id.as_deref(), Some("a1b2c3"));
        assert_eq!(job.end_time, None);
        assert_eq!(job.duration_hrs, Some(2.5));

        assert_eq!(report.logs.len(), 2);
        assert_eq!(report.logs[0].message(), "plain line");
        assert_eq!(report.logs[0].timestamp(), None);
        assert_eq!(report.logs[1].message(), "event");
        assert_eq!(report.logs[1].timestamp(), Some("2025-01-15T09:00:00"));
    }

    #[test]
    fn test_malformed_fields_do_not_reject_record() {
        let json = r#"{
            "agents": [{
                "agent_name": null,
                "region": "Scotland",
                "location_data": "unavailable",
                "job_schedule": [
                    {"job_id": 42, "start_time": 1700000000, "priority": "high"},
                    {"job_id": "ok", "start_time": "2025-01-15T10:00:00"}
                ]
            }]
        }"#;

        let report: StatusReport = serde_json::from_str(json).unwrap();
        let agent = &report.agents[0];
        assert_eq!(agent.agent_name, "");
        assert!(agent.location_data.is_none());
        assert_eq!(agent.job_schedule.len(), 2);

        let bad = &agent.job_schedule[0];
        assert_eq!(bad.job_id, None);
        assert_eq!(bad.start_time, None);
        assert_eq!(bad.priority, None);
        assert_eq!(agent.job_schedule[1].job_id.as_deref(), Some("ok"));
    }

    #[test]
    fn test_non_object_job_is_kept_as_empty_record() {
        let json = r#"{
            "agents": [{
                "agent_name": "Leeds Node",
                "region": "North",
                "job_schedule": [null, 17, {"job_id": "ok", "start_time": "2025-01-15T10:00:00"}]
            }]
        }"#;

        let report: DiscoveryReport = serde_json::from_str(json).unwrap();
        let jobs = &report.agents[0].job_schedule;
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].job_id, None);
        assert_eq!(jobs[0].start_time, None);
        assert_eq!(jobs[1].job_id, None);
        assert_eq!(jobs[2].job_id.as_deref(), Some("ok"));
    }

    #[test]
    fn test_non_string_names_do_not_reject_agent() {
        let json = r#"{
            "agents": [
                {"agent_name": "Leeds Node", "region": 7},
                {"agent_name": true, "region": {"name": "North"}},
                null
            ]
        }"#;

        let report: DiscoveryReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.agents.len(), 3);
        assert_eq!(report.agents[0].region, "7");
        assert_eq!(report.agents[1].agent_name, "true");
        assert_eq!(report.agents[1].region, "");
        assert_eq!(report.agents[2].agent_name, "");
    }

    #[test]
    fn test_unknown_log_shapes_are_kept() {
        let json = r#"{
            "agents": [{"agent_name": "Leeds Node", "region": "North"}],
            "logs": [
                "plain line",
                {"timestamp": "2025-01-15T09:00:00", "msg": "short key"},
                {"message": 5},
                null
            ]
        }"#;

        let report: StatusReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.agents.len(), 1);
        assert_eq!(report.logs.len(), 4);
        assert_eq!(report.logs[1].message(), "short key");
        assert_eq!(report.logs[1].timestamp(), Some("2025-01-15T09:00:00"));
        assert_eq!(report.logs[2].message(), "5");
        assert_eq!(report.logs[3].message(), "");
        assert_eq!(report.logs[3].timestamp(), None);
    }

    #[test]
    fn test_parse_jobs_report() {
        let json = r#"{
            "jobs": [
                {"job_id": "6f1c2a9e-77aa", "status": "PENDING", "estimated_runtime_hrs": 1.5, "priority": 2},
                {"job_id": 12, "status": null, "priority": "high"},
                null
            ]
        }"#;

        let report: JobsReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.jobs.len(), 3);
        assert_eq!(report.jobs[0].job_id.as_deref(), Some("6f1c2a9e-77aa"));
        assert_eq!(report.jobs[0].estimated_runtime_hrs, Some(1.5));
        assert_eq!(report.jobs[1].job_id, None);
        assert_eq!(report.jobs[1].priority, None);
        assert_eq!(report.jobs[2].status, None);

        let empty: JobsReport = serde_json::from_str(r#"{"jobs": null}"#).unwrap();
        assert!(empty.jobs.is_empty());
    }

    #[test]
    fn test_null_lists_default_to_empty() {
        let json = r#"{"agents": [{"agent_name": "Leeds Node", "region": "North", "job_schedule": null}], "logs": null}"#;
        let report: StatusReport = serde_json::from_str(json).unwrap();
        assert!(report.agents[0].job_schedule.is_empty());
        assert!(report.logs.is_empty());
    }

    #[test]
    fn test_parse_discovery_report() {
        let json = r#"{
            "total_agents": 2,
            "agents": [{
                "agent_name": "Bristol Node",
                "region": "South West",
                "discovery_count": 3,
                "last_discovery_time": "2025-01-15T09:30:00",
                "discovery_history": [{
                    "timestamp": "2025-01-15T09:30:00",
                    "city": "Bristol",
                    "query": "grid windows",
                    "result": {"message": {"catalogs": []}},
                    "discovered_locations": [{"name": "Bristol"}]
                }]
            }]
        }"#;

        let report: DiscoveryReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.total_agents, Some(2));
        let agent = &report.agents[0];
        assert_eq!(agent.discovery_count, Some(3));
        assert_eq!(agent.discovery_history[0].city, "Bristol");
        assert_eq!(agent.discovery_history[0].discovered_locations.len(), 1);
    }

    #[test]
    fn test_parse_clock_report() {
        let report: ClockReport =
            serde_json::from_str(r#"{"simulation_time": "2025-01-15T11:00:00"}"#).unwrap();
        assert_eq!(report.simulation_time, "2025-01-15T11:00:00");
    }
}
