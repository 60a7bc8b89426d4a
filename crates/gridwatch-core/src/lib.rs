//! Wire types for the grid agent backend.
//!
//! This crate describes the JSON payloads served by the status, discovery,
//! job queue and clock-control endpoints. Every field is optional or
//! defaulted, and lists are read record by record, so a single malformed
//! record never rejects a whole payload.

pub mod wire;

pub use wire::{
    AgentRecord, ClockReport, ComputeJob, DiscoveryRecord, DiscoveryReport, JobsReport,
    LocationData, LogEntry, RawJob, StatusReport,
};
