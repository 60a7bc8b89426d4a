//! Timeline state for gridwatch.
//!
//! Turns raw agent job schedules into ordered periods, projects them onto the
//! 48-hour viewing window and derives utilization aggregates. Everything in
//! here is synchronous and takes `now` explicitly.

pub mod aggregate;
pub mod clock;
pub mod discovery;
pub mod normalize;
pub mod queue;
pub mod snapshot;
pub mod timeline;
pub mod types;
pub mod view;
pub mod window;

pub use aggregate::{
    BUSY_THRESHOLD, RegionSummary, concurrent_jobs, current_utilization, summarize,
    summarize_regions,
};
pub use clock::{SimClock, StepDirection};
pub use discovery::{AgentDiscovery, CatalogSummary, DiscoverySnapshot};
pub use normalize::{DataQuality, IssueKind, MIN_DURATION, ScheduleIssue, normalize_schedule};
pub use queue::{JobQueueSnapshot, QueuedJob};
pub use snapshot::{DashboardSnapshot, LogLine, TimelineSnapshot};
pub use timeline::{build_timeline, build_timelines, filter_region, regions};
pub use types::{
    Job, JobStatus, LocationSignals, LocationTimeline, NetworkSummary, Period,
};
pub use view::{PollHealth, ViewState};
pub use window::{AxisTick, PeriodPhase, Projection, WINDOW_SPAN, Window, project_periods};
