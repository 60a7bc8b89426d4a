//! gridwatch - live 48-hour timeline of grid agent schedules.

mod control;
#[cfg(test)]
mod fake;
mod logging;
mod polling;
mod views;

use chrono::{DateTime, Utc};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gridwatch_cli::Args;
use gridwatch_client::{GridClient, StatusSource};
use gridwatch_monitor::{App, Command, Theme};
use gridwatch_state::{Projection, SimClock, StepDirection, TimelineSnapshot};
use logging::LogTarget;
use miette::{IntoDiagnostic, Result};
use polling::{Feed, PollingConfig, Refresher, TimelineFeed};
use ratatui::prelude::*;
use serde::Serialize;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::{Handle, Runtime};
use tracing::info;
use views::Views;

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<()> {
    let args = Args::parse();

    let target = match (&args.log_file, args.dump) {
        (Some(path), _) => LogTarget::File(path.as_path()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Discard,
    };
    logging::init(target)?;

    let runtime = Runtime::new().into_diagnostic()?;
    let _guard = runtime.enter();

    let client =
        GridClient::with_timeout(&args.api_url, args.request_timeout()).into_diagnostic()?;
    info!("Using backend at {}", client.base_url());
    let source: Arc<dyn StatusSource> = Arc::new(client);
    let clock = Arc::new(SimClock::wall());

    if args.dump {
        return runtime.block_on(dump(source, clock));
    }

    runtime.spawn(control::sync_clock(Arc::clone(&source), Arc::clone(&clock)));

    let config = polling_config(&args);
    let mut app = App::new(Arc::clone(&clock), Theme::by_name(&args.theme))
        .with_region(args.region.clone());
    let mut views = Views::start(
        Arc::clone(&source),
        Arc::clone(&clock),
        config.clone(),
        app.tab,
    );
    let controls = Controls {
        runtime: runtime.handle().clone(),
        source,
        clock,
        step: chrono::Duration::hours(args.step_hours.max(1)),
    };

    // Setup terminal
    enable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).into_diagnostic()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).into_diagnostic()?;

    // Run the main loop
    let res = run_app(&mut terminal, &mut app, &mut views, &controls, config.clock_tick);

    // Restore terminal
    disable_raw_mode().into_diagnostic()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).into_diagnostic()?;
    terminal.show_cursor().into_diagnostic()?;

    // Views and in-flight fetches stop with the runtime
    drop(views);

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn polling_config(args: &Args) -> PollingConfig {
    PollingConfig {
        status_interval: args.status_interval(),
        discovery_interval: args.discovery_interval(),
        timeline_interval: args.timeline_interval(),
        jobs_interval: args.jobs_interval(),
        ..PollingConfig::default()
    }
}

/// What the UI thread needs to act on [`Command`]s.
struct Controls {
    runtime: Handle,
    source: Arc<dyn StatusSource>,
    clock: Arc<SimClock>,
    /// Local step when the backend cannot move the clock
    step: chrono::Duration,
}

impl Controls {
    fn execute(&self, command: Command, views: &Views) {
        match command {
            Command::Refresh => views.refresh(),
            Command::StepClock(direction) => self.step_clock(direction, views.refresher()),
        }
    }

    /// Step in the background, then repoll the visible view.
    fn step_clock(&self, direction: StepDirection, refresher: Refresher) {
        let source = Arc::clone(&self.source);
        let clock = Arc::clone(&self.clock);
        let step = self.step;
        self.runtime.spawn(async move {
            let now = control::step_clock(source.as_ref(), &clock, direction, step).await;
            info!("Clock stepped {} to {}", direction.label(), now);
            refresher.trigger();
        });
    }
}

/// Main application loop.
///
/// Redraws when a view publishes, after input, and at least every
/// `clock_tick` so the clock keeps moving.
fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    views: &mut Views,
    controls: &Controls,
    clock_tick: Duration,
) -> io::Result<()> {
    let event_timeout = Duration::from_millis(100);
    let mut last_draw: Option<Instant> = None;

    loop {
        let changed = views.sync(app);
        if changed || last_draw.is_none_or(|at| at.elapsed() >= clock_tick) {
            terminal.draw(|frame| app.render(frame))?;
            last_draw = Some(Instant::now());
        }

        if app.poll_events(event_timeout)? {
            last_draw = None;
        }

        if app.should_quit {
            return Ok(());
        }

        if app.tab != views.tab() {
            views.switch_to(app.tab);
        }

        for command in app.take_commands() {
            controls.execute(command, views);
        }
    }
}

/// `--dump` output.
#[derive(Serialize)]
struct Dump<'a> {
    now: DateTime<Utc>,
    snapshot: &'a TimelineSnapshot,
    /// Window placement per location, in `snapshot.timelines` order
    projections: Vec<Vec<Projection>>,
}

/// Fetch the timeline once and print it as JSON.
async fn dump(source: Arc<dyn StatusSource>, clock: Arc<SimClock>) -> Result<()> {
    control::sync_clock(Arc::clone(&source), Arc::clone(&clock)).await;

    let snapshot = TimelineFeed::new(source, Arc::clone(&clock))
        .fetch()
        .await
        .into_diagnostic()?;
    let now = clock.now();
    let output = Dump {
        now,
        projections: snapshot.project(now),
        snapshot: &snapshot,
    };

    println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    Ok(())
}
