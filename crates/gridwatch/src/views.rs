//! Lifecycle of the view loops behind the monitor tabs.

use crate::polling::{
    DashboardFeed, DiscoveryFeed, JobsFeed, PollingConfig, Refresher, TimelineFeed, ViewHandle,
    spawn_view,
};
use gridwatch_client::StatusSource;
use gridwatch_monitor::{App, Tab};
use gridwatch_state::{
    DashboardSnapshot, DiscoverySnapshot, JobQueueSnapshot, SimClock, TimelineSnapshot,
};
use std::sync::Arc;
use tracing::info;

/// The polling loop of the visible tab.
enum ActiveView {
    Timeline(ViewHandle<TimelineSnapshot>),
    Dashboard(ViewHandle<DashboardSnapshot>),
    Discovery(ViewHandle<DiscoverySnapshot>),
    Jobs(ViewHandle<JobQueueSnapshot>),
}

impl ActiveView {
    fn name(&self) -> &'static str {
        match self {
            ActiveView::Timeline(h) => h.name(),
            ActiveView::Dashboard(h) => h.name(),
            ActiveView::Discovery(h) => h.name(),
            ActiveView::Jobs(h) => h.name(),
        }
    }

    fn stop(self) {
        match self {
            ActiveView::Timeline(h) => h.stop(),
            ActiveView::Dashboard(h) => h.stop(),
            ActiveView::Discovery(h) => h.stop(),
            ActiveView::Jobs(h) => h.stop(),
        }
    }
}

/// Keeps exactly one view loop running: the one of the active tab.
///
/// Switching tabs drops the previous handle, which aborts its loop and any
/// fetch it still has in flight.
pub struct Views {
    source: Arc<dyn StatusSource>,
    clock: Arc<SimClock>,
    config: PollingConfig,
    tab: Tab,
    active: ActiveView,
}

impl Views {
    pub fn start(
        source: Arc<dyn StatusSource>,
        clock: Arc<SimClock>,
        config: PollingConfig,
        tab: Tab,
    ) -> Self {
        let active = open(&source, &clock, &config, tab);
        Self {
            source,
            clock,
            config,
            tab,
            active,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Tear down the current loop and start the one for `tab`.
    pub fn switch_to(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        let next = open(&self.source, &self.clock, &self.config, tab);
        let previous = std::mem::replace(&mut self.active, next);
        info!("Switching from {} to {}", previous.name(), self.active.name());
        previous.stop();
        self.tab = tab;
    }

    /// Poll the active view now.
    pub fn refresh(&self) {
        match &self.active {
            ActiveView::Timeline(h) => h.refresh_now(),
            ActiveView::Dashboard(h) => h.refresh_now(),
            ActiveView::Discovery(h) => h.refresh_now(),
            ActiveView::Jobs(h) => h.refresh_now(),
        }
    }

    pub fn refresher(&self) -> Refresher {
        match &self.active {
            ActiveView::Timeline(h) => h.refresher(),
            ActiveView::Dashboard(h) => h.refresher(),
            ActiveView::Discovery(h) => h.refresher(),
            ActiveView::Jobs(h) => h.refresher(),
        }
    }

    /// Hand a newly published state to the app. Returns whether anything changed.
    pub fn sync(&mut self, app: &mut App) -> bool {
        match &mut self.active {
            ActiveView::Timeline(h) => {
                if let Some(state) = h.take_update() {
                    app.set_timeline(state);
                    return true;
                }
            }
            ActiveView::Dashboard(h) => {
                if let Some(state) = h.take_update() {
                    app.set_dashboard(state);
                    return true;
                }
            }
            ActiveView::Discovery(h) => {
                if let Some(state) = h.take_update() {
                    app.set_discovery(state);
                    return true;
                }
            }
            ActiveView::Jobs(h) => {
                if let Some(state) = h.take_update() {
                    app.set_jobs(state);
                    return true;
                }
            }
        }
        false
    }
}

fn open(
    source: &Arc<dyn StatusSource>,
    clock: &Arc<SimClock>,
    config: &PollingConfig,
    tab: Tab,
) -> ActiveView {
    match tab {
        Tab::Timeline => ActiveView::Timeline(spawn_view(
            TimelineFeed::new(Arc::clone(source), Arc::clone(clock)),
            config.timeline_interval,
        )),
        Tab::Dashboard => ActiveView::Dashboard(spawn_view(
            DashboardFeed::new(Arc::clone(source), Arc::clone(clock)),
            config.status_interval,
        )),
        Tab::Discovery => ActiveView::Discovery(spawn_view(
            DiscoveryFeed::new(Arc::clone(source)),
            config.discovery_interval,
        )),
        Tab::Jobs => ActiveView::Jobs(spawn_view(
            JobsFeed::new(Arc::clone(source)),
            config.jobs_interval,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeSource;
    use gridwatch_core::{AgentRecord, ComputeJob};
    use gridwatch_monitor::Theme;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::sleep;

    fn fast_config() -> PollingConfig {
        PollingConfig {
            status_interval: Duration::from_millis(20),
            discovery_interval: Duration::from_millis(20),
            timeline_interval: Duration::from_millis(20),
            jobs_interval: Duration::from_millis(20),
            clock_tick: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_switching_tabs_stops_previous_loop() {
        let source = Arc::new(FakeSource::default());
        let clock = Arc::new(SimClock::wall());
        let mut views = Views::start(source.clone(), clock, fast_config(), Tab::Timeline);

        sleep(Duration::from_millis(100)).await;
        assert!(source.discovery_calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(source.status_calls.load(Ordering::SeqCst), 0);

        views.switch_to(Tab::Dashboard);
        assert_eq!(views.tab(), Tab::Dashboard);
        sleep(Duration::from_millis(20)).await;
        let discovery_after_switch = source.discovery_calls.load(Ordering::SeqCst);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(
            source.discovery_calls.load(Ordering::SeqCst),
            discovery_after_switch
        );
        assert!(source.status_calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_sync_hands_snapshot_to_app() {
        let source = Arc::new(FakeSource::default());
        source.discovery.lock().unwrap().agents = vec![AgentRecord {
            agent_name: "Leeds Node".to_string(),
            region: "North".to_string(),
            ..Default::default()
        }];
        let clock = Arc::new(SimClock::wall());
        let mut views = Views::start(source, clock.clone(), fast_config(), Tab::Discovery);
        let mut app = App::new(clock, Theme::dark());

        tokio::time::timeout(Duration::from_secs(2), async {
            while !views.sync(&mut app) {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("no snapshot arrived");
        assert_eq!(app.discovery().snapshot.agents.len(), 1);
        assert_eq!(app.discovery().snapshot.agents[0].agent_name, "Leeds Node");
    }

    #[tokio::test]
    async fn test_jobs_tab_polls_queue() {
        let source = Arc::new(FakeSource::default());
        source.jobs.lock().unwrap().jobs = vec![ComputeJob {
            job_id: Some("6f1c2a9e-77aa".to_string()),
            status: Some("ASSIGNED".to_string()),
            estimated_runtime_hrs: Some(1.5),
            priority: Some(3),
        }];
        let clock = Arc::new(SimClock::wall());
        let mut views =
            Views::start(source.clone(), clock.clone(), fast_config(), Tab::Dashboard);
        let mut app = App::new(clock, Theme::dark());

        views.switch_to(Tab::Jobs);
        tokio::time::timeout(Duration::from_secs(2), async {
            while !views.sync(&mut app) {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("no snapshot arrived");
        assert_eq!(app.jobs().snapshot.jobs.len(), 1);
        assert_eq!(app.jobs().snapshot.jobs[0].job_id, "6f1c2a9e-77aa");

        // Leaving the tab stops the queue loop
        views.switch_to(Tab::Timeline);
        sleep(Duration::from_millis(20)).await;
        let jobs_after_switch = source.jobs_calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(source.jobs_calls.load(Ordering::SeqCst), jobs_after_switch);
    }
}
