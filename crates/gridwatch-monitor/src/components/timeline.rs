//! Timeline view: one lane per location across the 48-hour window.

use crate::app::Tab;
use crate::components::ViewTabs;
use crate::ui::Theme;
use chrono::{DateTime, Utc};
use gridwatch_parsers::{format_hours, format_offset_hours, short_id};
use gridwatch_state::{
    LocationTimeline, PeriodPhase, Projection, Window, project_periods,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Width of the location name column.
const NAME_WIDTH: usize = 18;

/// Hours between axis labels.
const TICK_HOURS: i64 = 6;

/// What one terminal column of a lane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneCell {
    Empty,
    Now,
    Period(PeriodPhase),
}

impl LaneCell {
    fn rank(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Now => 1,
            Self::Period(PeriodPhase::Past) => 2,
            Self::Period(PeriodPhase::Scheduled) => 3,
            Self::Period(PeriodPhase::Live) => 4,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Empty => " ",
            Self::Now => "│",
            Self::Period(PeriodPhase::Past) => "░",
            Self::Period(PeriodPhase::Scheduled) => "▒",
            Self::Period(PeriodPhase::Live) => "█",
        }
    }
}

/// Column of a window fraction in a lane `width` cells wide.
pub fn column(fraction: f64, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    ((fraction * width as f64).floor().max(0.0) as usize).min(width - 1)
}

/// Rasterize projected periods into lane cells.
///
/// Every visible period with a non-zero width covers at least one cell.
/// Where periods overlap, live beats scheduled beats past.
pub fn lane_cells(projections: &[Projection], width: usize) -> Vec<LaneCell> {
    let mut cells = vec![LaneCell::Empty; width];
    if width == 0 {
        return cells;
    }
    cells[column(0.5, width)] = LaneCell::Now;

    for p in projections
        .iter()
        .filter(|p| p.visible && p.width_fraction > 0.0)
    {
        let start = column(p.left_fraction, width);
        let end = (((p.left_fraction + p.width_fraction) * width as f64).ceil() as usize)
            .clamp(start + 1, width);
        let cell = LaneCell::Period(p.phase);
        for slot in &mut cells[start..end] {
            if cell.rank() > slot.rank() {
                *slot = cell;
            }
        }
    }
    cells
}

/// Axis labels (`-24h` … `Now` … `+24h`) laid out over `width` columns.
pub fn axis_line(width: usize) -> String {
    let mut axis = vec![' '; width];
    let mut next_free = 0;

    for tick in Window::ticks(TICK_HOURS) {
        let label = format_offset_hours(tick.offset_hours);
        if label.len() > width {
            continue;
        }
        let start = column(tick.fraction, width).min(width - label.len());
        if start < next_free {
            continue;
        }
        for (slot, ch) in axis[start..].iter_mut().zip(label.chars()) {
            *slot = ch;
        }
        next_free = start + label.len() + 1;
    }
    axis.into_iter().collect()
}

pub struct TimelineView;

impl TimelineView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        timelines: &[&LocationTimeline],
        selected: usize,
        now: DateTime<Utc>,
        theme: &Theme,
    ) {
        let mut title = ViewTabs::title_line(Tab::Timeline);
        title.spans.push(Span::styled(
            format!("({} locations) ", timelines.len()),
            Style::default().fg(theme.muted),
        ));
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Lanes
                Constraint::Length(1), // Legend
                Constraint::Length(7), // Selected location
            ])
            .split(inner);

        render_lanes(frame, chunks[0], timelines, selected, now, theme);
        render_legend(frame, chunks[1], theme);
        if let Some(timeline) = timelines.get(selected) {
            render_detail(frame, chunks[2], timeline, now, theme);
        }
    }
}

fn render_lanes(
    frame: &mut Frame,
    area: Rect,
    timelines: &[&LocationTimeline],
    selected: usize,
    now: DateTime<Utc>,
    theme: &Theme,
) {
    // name + utilization marker + space
    let lane_width = (area.width as usize).saturating_sub(NAME_WIDTH + 2);
    let rows = (area.height as usize).saturating_sub(1);

    let mut lines = vec![Line::from(vec![
        Span::raw(" ".repeat(NAME_WIDTH + 2)),
        Span::styled(axis_line(lane_width), Style::default().fg(theme.muted)),
    ])];

    if timelines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No locations reported",
            Style::default().fg(theme.muted),
        )));
    }

    let offset = selected.saturating_sub(rows.saturating_sub(1));
    for (i, timeline) in timelines.iter().enumerate().skip(offset).take(rows) {
        let name_style = if i == selected {
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(theme.foreground)
        };
        let busy = !timeline.is_available_at(now);
        let marker = if busy {
            Span::styled("●", Style::default().fg(theme.live))
        } else {
            Span::styled("○", Style::default().fg(theme.muted))
        };

        let mut spans = vec![
            Span::styled(
                format!("{:<width$}", short_id(&timeline.location, NAME_WIDTH - 1), width = NAME_WIDTH),
                name_style,
            ),
            marker,
            Span::raw(" "),
        ];

        let projections = project_periods(&timeline.periods, now);
        for cell in lane_cells(&projections, lane_width) {
            let color = match cell {
                LaneCell::Period(phase) => theme.phase(phase),
                LaneCell::Now => theme.now_marker,
                LaneCell::Empty => theme.muted,
            };
            spans.push(Span::styled(cell.symbol(), Style::default().fg(color)));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_legend(frame: &mut Frame, area: Rect, theme: &Theme) {
    let legend = Line::from(vec![
        Span::styled("░ past  ", Style::default().fg(theme.past)),
        Span::styled("█ live  ", Style::default().fg(theme.live)),
        Span::styled("▒ scheduled  ", Style::default().fg(theme.scheduled)),
        Span::styled("│ now", Style::default().fg(theme.now_marker)),
    ]);
    frame.render_widget(Paragraph::new(legend), area);
}

fn render_detail(
    frame: &mut Frame,
    area: Rect,
    timeline: &LocationTimeline,
    now: DateTime<Utc>,
    theme: &Theme,
) {
    let signals = &timeline.signals;
    let mut lines = vec![Line::from(vec![
        Span::styled(
            timeline.location.clone(),
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}  {}", timeline.region, timeline.agent_name),
            Style::default().fg(theme.muted),
        ),
        Span::styled(
            format!("  {:.0} gCO2/kWh", signals.carbon_intensity),
            Style::default().fg(theme.carbon(signals.carbon_intensity)),
        ),
        Span::styled(
            format!("  {:.0}% renewable", signals.renewable_mix),
            Style::default().fg(theme.success),
        ),
        Span::styled(
            signals
                .price
                .map(|p| format!("  £{:.3}/kWh", p))
                .unwrap_or_default(),
            Style::default().fg(theme.foreground),
        ),
    ])];

    let window = Window::around(now);
    let upcoming = timeline
        .periods
        .iter()
        .filter(|p| p.end >= window.start)
        .take(area.height.saturating_sub(1) as usize);
    for period in upcoming {
        let phase = window.project(period).phase;
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {} ", period.status.symbol()),
                Style::default().fg(theme.phase(phase)),
            ),
            Span::styled(
                format!("{:<14}", short_id(period.job_id().unwrap_or("-"), 13)),
                Style::default().fg(theme.foreground),
            ),
            Span::styled(
                format!(
                    "{} → {}",
                    period.start.format("%d %H:%M"),
                    period.end.format("%d %H:%M")
                ),
                Style::default().fg(theme.muted),
            ),
            Span::styled(
                format!("  {:>5}", format_hours(period.duration_hrs)),
                Style::default().fg(theme.foreground),
            ),
            Span::styled(
                period
                    .priority
                    .map(|p| format!("  P{}", p))
                    .unwrap_or_default(),
                Style::default().fg(theme.warning),
            ),
            Span::styled(
                format!("  {}", period.status.label()),
                Style::default().fg(theme.phase(phase)),
            ),
        ]));
    }

    let block = Block::default()
        .borders(Borders::TOP)
        .title(format!(" {} jobs ", timeline.total_jobs()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
