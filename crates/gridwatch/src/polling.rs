//! Background polling: one independent refresh loop per view.

use async_trait::async_trait;
use chrono::Utc;
use gridwatch_client::{ClientError, StatusSource};
use gridwatch_state::{
    DashboardSnapshot, DiscoverySnapshot, JobQueueSnapshot, SimClock, TimelineSnapshot, ViewState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

/// Configuration for the polling loops.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval for the dashboard (`/status`).
    pub status_interval: Duration,
    /// Interval for the discovery view (`/discovery/status`).
    pub discovery_interval: Duration,
    /// Interval for the timeline view.
    pub timeline_interval: Duration,
    /// Interval for the jobs view (`/jobs`).
    pub jobs_interval: Duration,
    /// Redraw interval for the clock display.
    pub clock_tick: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_secs(2),
            discovery_interval: Duration::from_secs(3),
            timeline_interval: Duration::from_secs(5),
            jobs_interval: Duration::from_secs(2),
            clock_tick: Duration::from_secs(1),
        }
    }
}

/// One fetch-and-transform step of a view.
#[async_trait]
pub trait Feed: Send + Sync + 'static {
    type Snapshot: Default + Send + Sync + 'static;

    /// Name used in log messages.
    fn name(&self) -> &'static str;

    /// Fetch the payload and build a complete snapshot from it.
    async fn fetch(&self) -> Result<Self::Snapshot, ClientError>;
}

/// Handle to a running view loop.
///
/// Dropping the handle (or calling [`ViewHandle::stop`]) aborts the loop
/// together with every in-flight fetch, so nothing is applied afterwards.
pub struct ViewHandle<S> {
    name: &'static str,
    state: watch::Receiver<ViewState<S>>,
    refresh: Refresher,
    task: JoinHandle<()>,
}

impl<S> ViewHandle<S> {
    /// A receiver that is notified on every applied snapshot or failure.
    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<ViewState<S>> {
        self.state.clone()
    }

    /// The state published most recently.
    #[cfg(test)]
    pub fn current(&self) -> ViewState<S> {
        self.state.borrow().clone()
    }

    /// The published state, if it changed since the last call.
    pub fn take_update(&mut self) -> Option<ViewState<S>> {
        if self.state.has_changed().unwrap_or(false) {
            Some(self.state.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// Poll now instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        self.refresh.trigger();
    }

    pub fn refresher(&self) -> Refresher {
        self.refresh.clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(self) {}
}

impl<S> Drop for ViewHandle<S> {
    fn drop(&mut self) {
        self.task.abort();
        debug!("{} view stopped", self.name);
    }
}

/// Cloneable trigger for an immediate poll of one view.
#[derive(Debug, Clone, Default)]
pub struct Refresher(Arc<Notify>);

impl Refresher {
    pub fn trigger(&self) {
        self.0.notify_one();
    }
}

/// Start polling `feed` every `period`, beginning immediately.
pub fn spawn_view<F: Feed>(feed: F, period: Duration) -> ViewHandle<F::Snapshot> {
    let name = feed.name();
    let (tx, rx) = watch::channel(ViewState::default());
    let refresh = Refresher::default();

    info!("Starting {} view, polling every {:?}", name, period);
    let task = tokio::spawn(run(Arc::new(feed), period, tx, refresh.clone()));

    ViewHandle {
        name,
        state: rx,
        refresh,
        task,
    }
}

/// Main loop of one view.
///
/// Ticks and manual refreshes never wait for earlier fetches, so requests may
/// overlap. Each request gets an increasing sequence number and a response is
/// only applied when it is newer than the last applied one.
async fn run<F: Feed>(
    feed: Arc<F>,
    period: Duration,
    tx: watch::Sender<ViewState<F::Snapshot>>,
    refresh: Refresher,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut in_flight: JoinSet<(u64, Result<F::Snapshot, ClientError>)> = JoinSet::new();
    let mut issued = 0u64;
    let mut guard = SequenceGuard::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                issued += 1;
                spawn_fetch(&mut in_flight, &feed, issued);
            }
            _ = refresh.0.notified() => {
                issued += 1;
                debug!("{}: manual refresh #{}", feed.name(), issued);
                spawn_fetch(&mut in_flight, &feed, issued);
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                match joined {
                    Ok((sequence, result)) => apply(feed.name(), &tx, &mut guard, sequence, result),
                    Err(e) => error!("Error polling {}: fetch task failed: {}", feed.name(), e),
                }
            }
        }

        if tx.is_closed() {
            debug!("{}: no readers left, stopping", feed.name());
            break;
        }
    }
}

fn spawn_fetch<F: Feed>(
    in_flight: &mut JoinSet<(u64, Result<F::Snapshot, ClientError>)>,
    feed: &Arc<F>,
    sequence: u64,
) {
    let feed = Arc::clone(feed);
    in_flight.spawn(async move { (sequence, feed.fetch().await) });
}

/// Publish one completed fetch unless a newer response already won.
fn apply<S>(
    name: &str,
    tx: &watch::Sender<ViewState<S>>,
    guard: &mut SequenceGuard,
    sequence: u64,
    result: Result<S, ClientError>,
) {
    if !guard.is_current(sequence) {
        debug!(
            "{}: discarding response #{} (#{} already applied)",
            name, sequence, guard.applied
        );
        return;
    }

    match result {
        Ok(snapshot) => {
            guard.accept(sequence);
            tx.send_modify(|state| state.apply(snapshot, sequence, Utc::now()));
        }
        Err(e) => {
            error!("Error polling {}: {}", name, e);
            tx.send_modify(|state| state.health.record_failure(e.to_string(), Utc::now()));
        }
    }
}

/// Tracks the newest applied request of one view.
#[derive(Debug, Default)]
struct SequenceGuard {
    applied: u64,
}

impl SequenceGuard {
    fn is_current(&self, sequence: u64) -> bool {
        sequence > self.applied
    }

    fn accept(&mut self, sequence: u64) {
        self.applied = self.applied.max(sequence);
    }
}

/// Timeline view: every agent's schedule projected on the 48h window.
pub struct TimelineFeed {
    source: Arc<dyn StatusSource>,
    clock: Arc<SimClock>,
}

impl TimelineFeed {
    pub fn new(source: Arc<dyn StatusSource>, clock: Arc<SimClock>) -> Self {
        Self { source, clock }
    }
}

#[async_trait]
impl Feed for TimelineFeed {
    type Snapshot = TimelineSnapshot;

    fn name(&self) -> &'static str {
        "timeline"
    }

    async fn fetch(&self) -> Result<TimelineSnapshot, ClientError> {
        let report = self.source.discovery_status().await?;
        Ok(TimelineSnapshot::build(&report.agents, self.clock.now()))
    }
}

/// Dashboard view: network summary, regions and the event log.
pub struct DashboardFeed {
    source: Arc<dyn StatusSource>,
    clock: Arc<SimClock>,
}

impl DashboardFeed {
    pub fn new(source: Arc<dyn StatusSource>, clock: Arc<SimClock>) -> Self {
        Self { source, clock }
    }
}

#[async_trait]
impl Feed for DashboardFeed {
    type Snapshot = DashboardSnapshot;

    fn name(&self) -> &'static str {
        "dashboard"
    }

    async fn fetch(&self) -> Result<DashboardSnapshot, ClientError> {
        let report = self.source.status().await?;
        Ok(DashboardSnapshot::build(
            &report.agents,
            &report.logs,
            self.clock.now(),
        ))
    }
}

/// Discovery view: per-agent discovery activity.
pub struct DiscoveryFeed {
    source: Arc<dyn StatusSource>,
}

impl DiscoveryFeed {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Feed for DiscoveryFeed {
    type Snapshot = DiscoverySnapshot;

    fn name(&self) -> &'static str {
        "discovery"
    }

    async fn fetch(&self) -> Result<DiscoverySnapshot, ClientError> {
        let report = self.source.discovery_status().await?;
        Ok(DiscoverySnapshot::build(&report))
    }
}

/// Jobs view: the compute job submission queue.
pub struct JobsFeed {
    source: Arc<dyn StatusSource>,
}

impl JobsFeed {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Feed for JobsFeed {
    type Snapshot = JobQueueSnapshot;

    fn name(&self) -> &'static str {
        "jobs"
    }

    async fn fetch(&self) -> Result<JobQueueSnapshot, ClientError> {
        let report = self.source.jobs().await?;
        Ok(JobQueueSnapshot::build(&report))
    }
}
