//! Dashboard view: network summary, region rollup and the event log.

use crate::app::Tab;
use crate::components::ViewTabs;
use crate::ui::Theme;
use chrono::{DateTime, Utc};
use gridwatch_state::{DashboardSnapshot, LogLine, NetworkSummary, RegionSummary};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
};

pub struct DashboardView;

impl DashboardView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        snapshot: &DashboardSnapshot,
        region: Option<&str>,
        log_scroll: usize,
        now: DateTime<Utc>,
        theme: &Theme,
    ) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(4)])
            .split(columns[0]);

        let summary = snapshot.network.summary_at(now);
        let regions = snapshot.network.regions(now);
        render_summary(frame, left[0], &summary, snapshot, theme);
        render_regions(frame, left[1], &regions, region, theme);
        render_log(frame, columns[1], &snapshot.logs, log_scroll, theme);
    }
}

fn stat<'a>(label: &'a str, value: String, style: Style, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<18}", label), Style::default().fg(theme.muted)),
        Span::styled(value, style),
    ])
}

fn render_summary(
    frame: &mut Frame,
    area: Rect,
    summary: &NetworkSummary,
    snapshot: &DashboardSnapshot,
    theme: &Theme,
) {
    let plain = Style::default().fg(theme.foreground);
    let issues = snapshot.network.quality.len();

    let lines = vec![
        stat("Locations", summary.total_locations.to_string(), plain, theme),
        stat(
            "Available now",
            summary.available_now.to_string(),
            Style::default().fg(theme.success),
            theme,
        ),
        stat(
            "Busy now",
            summary.busy_now.to_string(),
            Style::default().fg(theme.live),
            theme,
        ),
        stat(
            "Avg utilization",
            format!("{:.1}%", summary.average_utilization),
            plain,
            theme,
        ),
        stat(
            "Jobs",
            format!(
                "{} total · {} live · {} scheduled",
                summary.total_jobs, summary.live_jobs, summary.scheduled_jobs
            ),
            plain,
            theme,
        ),
        stat(
            "Oversubscribed",
            summary.oversubscribed.to_string(),
            Style::default().fg(if summary.oversubscribed > 0 {
                theme.warning
            } else {
                theme.muted
            }),
            theme,
        ),
        stat(
            "Data issues",
            issues.to_string(),
            Style::default().fg(if issues > 0 { theme.warning } else { theme.muted }),
            theme,
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(ViewTabs::title_line(Tab::Dashboard));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_regions(
    frame: &mut Frame,
    area: Rect,
    regions: &[RegionSummary],
    selected: Option<&str>,
    theme: &Theme,
) {
    let header = Row::new(vec![
        "Region", "Locs", "Busy", "Util", "Carbon", "Renew", "Price",
    ])
    .style(
        Style::default()
            .fg(theme.foreground)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    );

    let rows: Vec<Row> = regions
        .iter()
        .map(|r| {
            let base = if selected == Some(r.region.as_str()) {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Row::new(vec![
                Span::styled(r.region.clone(), base.fg(theme.highlight)),
                Span::styled(r.locations.to_string(), base.fg(theme.foreground)),
                Span::styled(
                    r.busy.to_string(),
                    base.fg(if r.busy > 0 { theme.live } else { theme.muted }),
                ),
                Span::styled(
                    format!("{:.0}%", r.average_utilization),
                    base.fg(theme.foreground),
                ),
                Span::styled(
                    format!("{:.0}", r.average_carbon),
                    base.fg(theme.carbon(r.average_carbon)),
                ),
                Span::styled(
                    format!("{:.0}%", r.average_renewable),
                    base.fg(theme.success),
                ),
                Span::styled(
                    r.average_price
                        .map(|p| format!("{:.3}", p))
                        .unwrap_or_else(|| "-".to_string()),
                    base.fg(theme.foreground),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),   // Region
            Constraint::Length(5), // Locations
            Constraint::Length(5), // Busy
            Constraint::Length(5), // Utilization
            Constraint::Length(7), // Carbon
            Constraint::Length(6), // Renewable
            Constraint::Length(7), // Price
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Regions ({}) ", regions.len())),
    );

    frame.render_widget(table, area);
}

/// The log lines visible in `rows` rows, `scroll` lines up from the newest.
pub fn visible_logs(logs: &[LogLine], rows: usize, scroll: usize) -> &[LogLine] {
    let end = logs.len().saturating_sub(scroll);
    let start = end.saturating_sub(rows);
    &logs[start..end]
}

fn render_log(frame: &mut Frame, area: Rect, logs: &[LogLine], scroll: usize, theme: &Theme) {
    let rows = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = if logs.is_empty() {
        vec![Line::from(Span::styled(
            "No events yet",
            Style::default().fg(theme.muted),
        ))]
    } else {
        visible_logs(logs, rows, scroll)
            .iter()
            .map(|log| {
                let stamp = log
                    .timestamp
                    .map(|t| t.format("%H:%M:%S ").to_string())
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(stamp, Style::default().fg(theme.muted)),
                    Span::styled(log.message.clone(), Style::default().fg(theme.foreground)),
                ])
            })
            .collect()
    };

    let title = if scroll > 0 {
        format!(" Events ({}, ↑{}) ", logs.len(), scroll)
    } else {
        format!(" Events ({}) ", logs.len())
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
