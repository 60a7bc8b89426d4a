//! Main TUI application.

use crate::components::{
    DashboardView, DiscoveryView, Footer, Header, HeaderInfo, JobsView, TimelineView,
};
use crate::ui::Theme;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use gridwatch_state::{
    DashboardSnapshot, DiscoverySnapshot, JobQueueSnapshot, SimClock, StepDirection,
    TimelineSnapshot, ViewState, filter_region, regions,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Clear,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Top-level view; each one is backed by its own polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Timeline,
    Dashboard,
    Discovery,
    Jobs,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Timeline, Tab::Dashboard, Tab::Discovery, Tab::Jobs];

    pub fn next(self) -> Self {
        match self {
            Self::Timeline => Self::Dashboard,
            Self::Dashboard => Self::Discovery,
            Self::Discovery => Self::Jobs,
            Self::Jobs => Self::Timeline,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Timeline => Self::Jobs,
            Self::Dashboard => Self::Timeline,
            Self::Discovery => Self::Dashboard,
            Self::Jobs => Self::Discovery,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeline => "Timeline",
            Self::Dashboard => "Dashboard",
            Self::Discovery => "Discovery",
            Self::Jobs => "Jobs",
        }
    }
}

/// Work the UI asks the runtime to do on its behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Step the simulation clock, then refresh the active view
    StepClock(StepDirection),
    /// Poll the active view now
    Refresh,
}

/// Main application state.
pub struct App {
    pub should_quit: bool,
    pub tab: Tab,
    pub show_help: bool,
    pub theme: Theme,
    clock: Arc<SimClock>,
    timeline: ViewState<TimelineSnapshot>,
    dashboard: ViewState<DashboardSnapshot>,
    discovery: ViewState<DiscoverySnapshot>,
    jobs: ViewState<JobQueueSnapshot>,
    region: Option<String>,
    /// Selected lane (timeline), scroll from newest (dashboard log) or
    /// selected row (discovery, jobs)
    selected: usize,
    commands: Vec<Command>,
    status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(clock: Arc<SimClock>, theme: Theme) -> Self {
        Self {
            should_quit: false,
            tab: Tab::default(),
            show_help: false,
            theme,
            clock,
            timeline: ViewState::default(),
            dashboard: ViewState::default(),
            discovery: ViewState::default(),
            jobs: ViewState::default(),
            region: None,
            selected: 0,
            commands: Vec::new(),
            status_message: None,
        }
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn set_timeline(&mut self, state: ViewState<TimelineSnapshot>) {
        self.timeline = state;
        self.clamp_selection();
    }

    pub fn set_dashboard(&mut self, state: ViewState<DashboardSnapshot>) {
        self.dashboard = state;
        self.clamp_selection();
    }

    pub fn set_discovery(&mut self, state: ViewState<DiscoverySnapshot>) {
        self.discovery = state;
        self.clamp_selection();
    }

    pub fn set_jobs(&mut self, state: ViewState<JobQueueSnapshot>) {
        self.jobs = state;
        self.clamp_selection();
    }

    pub fn timeline(&self) -> &ViewState<TimelineSnapshot> {
        &self.timeline
    }

    pub fn dashboard(&self) -> &ViewState<DashboardSnapshot> {
        &self.dashboard
    }

    pub fn discovery(&self) -> &ViewState<DiscoverySnapshot> {
        &self.discovery
    }

    pub fn jobs(&self) -> &ViewState<JobQueueSnapshot> {
        &self.jobs
    }

    /// Drain the commands queued by key presses.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Show a message in the footer for a few seconds.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
        self.selected = 0;
    }

    pub fn previous_tab(&mut self) {
        self.tab = self.tab.previous();
        self.selected = 0;
    }

    /// The network data backing the current tab, if it has any.
    fn network(&self) -> Option<&TimelineSnapshot> {
        match self.tab {
            Tab::Timeline => Some(self.timeline.snapshot.as_ref()),
            Tab::Dashboard => Some(&self.dashboard.snapshot.network),
            Tab::Discovery | Tab::Jobs => None,
        }
    }

    /// Cycle through "all regions" and each region in the current data.
    pub fn cycle_region(&mut self) {
        let known = self.network().map(|n| regions(&n.timelines)).unwrap_or_default();
        self.region = match &self.region {
            None => known.first().cloned(),
            Some(current) => known
                .iter()
                .position(|r| r == current)
                .and_then(|i| known.get(i + 1))
                .cloned(),
        };
        self.selected = 0;
        let label = self.region.as_deref().unwrap_or("all regions").to_string();
        self.set_status(format!("Region: {}", label));
    }

    fn list_len(&self) -> usize {
        match self.tab {
            Tab::Timeline => filter_region(&self.timeline.snapshot.timelines, self.region()).len(),
            Tab::Dashboard => self.dashboard.snapshot.logs.len(),
            Tab::Discovery => self.discovery.snapshot.agents.len(),
            Tab::Jobs => self.jobs.snapshot.jobs.len(),
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.list_len().saturating_sub(1));
    }

    /// Move down a lane/row, or towards newer events on the dashboard.
    pub fn select_next(&mut self) {
        match self.tab {
            Tab::Dashboard => self.selected = self.selected.saturating_sub(1),
            _ => {
                let len = self.list_len();
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
        }
    }

    pub fn select_previous(&mut self) {
        match self.tab {
            Tab::Dashboard => {
                self.selected = (self.selected + 1).min(self.list_len().saturating_sub(1))
            }
            _ => self.selected = self.selected.saturating_sub(1),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn step_clock(&mut self, direction: StepDirection) {
        self.commands.push(Command::StepClock(direction));
        self.set_status(format!("Stepping clock {}…", direction.label()));
    }

    fn refresh(&mut self) {
        self.commands.push(Command::Refresh);
        self.set_status("Refreshing…");
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Tab => self.next_tab(),
            KeyCode::BackTab => self.previous_tab(),
            KeyCode::Char('1') => self.tab = Tab::Timeline,
            KeyCode::Char('2') => self.tab = Tab::Dashboard,
            KeyCode::Char('3') => self.tab = Tab::Discovery,
            KeyCode::Char('4') => self.tab = Tab::Jobs,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char(']') | KeyCode::Right => self.step_clock(StepDirection::Forward),
            KeyCode::Char('[') | KeyCode::Left => self.step_clock(StepDirection::Backward),
            KeyCode::Char('R') => self.refresh(),
            KeyCode::Char('r') => self.cycle_region(),
            KeyCode::Char('?') => self.toggle_help(),
            _ => {}
        }
        self.clamp_selection();
    }

    /// Poll for events and handle them.
    pub fn poll_events(&mut self, timeout: Duration) -> std::io::Result<bool> {
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
        {
            self.handle_key(key);
            return Ok(true);
        }
        Ok(false)
    }

    /// Render the UI.
    ///
    /// Window placement is recomputed from the clock on every call.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let now = self.clock.now();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Main content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let summary = self
            .network()
            .map(|n| n.summary_at(now))
            .unwrap_or_default();
        let (age, stale) = self.freshness();
        let header = HeaderInfo {
            now,
            simulated: self.clock.is_simulated(),
            summary: &summary,
            region: self.region(),
            age,
            stale,
        };
        Header::render(frame, chunks[0], &header, &self.theme);

        match self.tab {
            Tab::Timeline => {
                let timelines = filter_region(&self.timeline.snapshot.timelines, self.region());
                TimelineView::render(frame, chunks[1], &timelines, self.selected, now, &self.theme);
            }
            Tab::Dashboard => DashboardView::render(
                frame,
                chunks[1],
                &self.dashboard.snapshot,
                self.region(),
                self.selected,
                now,
                &self.theme,
            ),
            Tab::Discovery => DiscoveryView::render(
                frame,
                chunks[1],
                &self.discovery.snapshot,
                self.selected,
                now,
                &self.theme,
            ),
            Tab::Jobs => JobsView::render(
                frame,
                chunks[1],
                &self.jobs.snapshot,
                self.selected,
                &self.theme,
            ),
        }

        // Status message for 3 seconds, then help again
        let status_msg = self.status_message.as_ref().and_then(|(msg, timestamp)| {
            if timestamp.elapsed() < Duration::from_secs(3) {
                Some(msg.as_str())
            } else {
                None
            }
        });
        Footer::render(
            frame,
            chunks[2],
            status_msg,
            self.consecutive_failures(),
            &self.theme,
        );

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    /// Snapshot age (wall clock) and failure state of the active view.
    fn freshness(&self) -> (Option<chrono::Duration>, bool) {
        let now = Utc::now();
        match self.tab {
            Tab::Timeline => (self.timeline.age(now), !self.timeline.health.is_healthy()),
            Tab::Dashboard => (self.dashboard.age(now), !self.dashboard.health.is_healthy()),
            Tab::Discovery => (self.discovery.age(now), !self.discovery.health.is_healthy()),
            Tab::Jobs => (self.jobs.age(now), !self.jobs.health.is_healthy()),
        }
    }

    fn consecutive_failures(&self) -> u32 {
        match self.tab {
            Tab::Timeline => self.timeline.health.consecutive_failures,
            Tab::Dashboard => self.dashboard.health.consecutive_failures,
            Tab::Discovery => self.discovery.health.consecutive_failures,
            Tab::Jobs => self.jobs.health.consecutive_failures,
        }
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        use ratatui::style::{Color, Style};
        use ratatui::widgets::{Block, Borders, Paragraph};

        let area = centered_rect(60, 60, frame.area());

        let help_text = r#"
  Keyboard Shortcuts
  ──────────────────

  Views
  Tab / S-Tab  Next / previous view
  1 2 3 4      Timeline / Dashboard / Discovery / Jobs

  Navigation
  j/k / ↑↓     Select location / scroll events
  g / Home     Back to top
  r            Cycle region filter

  Simulation
  ] / →        Step clock forward
  [ / ←        Step clock backward
  R            Refresh now

  ?            This help
  q / Ctrl+C   Quit

  Press any key to close
"#;

        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .style(Style::default().bg(Color::DarkGray)),
            )
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
