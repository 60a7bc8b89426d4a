//! Header component with utilization gauge and clock.

use crate::ui::Theme;
use chrono::{DateTime, Duration, Utc};
use gridwatch_parsers::format_duration;
use gridwatch_state::NetworkSummary;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge},
};

/// Everything the header shows for the active view.
pub struct HeaderInfo<'a> {
    pub now: DateTime<Utc>,
    pub simulated: bool,
    pub summary: &'a NetworkSummary,
    pub region: Option<&'a str>,
    /// Age of the active view's snapshot, `None` before the first fetch
    pub age: Option<Duration>,
    /// The active view's latest poll failed
    pub stale: bool,
}

pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, info: &HeaderInfo<'_>, theme: &Theme) {
        let summary = info.summary;

        let mut title = vec![
            Span::raw("⚡ gridwatch"),
            Span::styled(" │ ", Style::default().fg(theme.muted)),
            Span::styled(
                info.region.unwrap_or("all regions").to_string(),
                Style::default().fg(theme.highlight),
            ),
            Span::styled(" │ ", Style::default().fg(theme.muted)),
        ];
        title.push(freshness(info, theme));

        let mut clock = vec![Span::styled(
            info.now.format("%Y-%m-%d %H:%M:%S").to_string(),
            Style::default().fg(theme.warning),
        )];
        if info.simulated {
            clock.push(Span::styled(" [SIM]", Style::default().fg(theme.live)));
        }
        let clock_line = Line::from(clock).alignment(Alignment::Right);

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Line::from(title))
                    .title_top(clock_line),
            )
            .gauge_style(Style::default().fg(theme.live))
            .percent(summary.average_utilization.clamp(0.0, 100.0) as u16)
            .label(summary_label(summary));

        frame.render_widget(gauge, area);
    }
}

fn freshness(info: &HeaderInfo<'_>, theme: &Theme) -> Span<'static> {
    match info.age {
        None if info.stale => Span::styled("backend unreachable", Style::default().fg(theme.error)),
        None => Span::styled("waiting for data", Style::default().fg(theme.muted)),
        Some(age) => {
            let age = format_duration(age.num_seconds().max(0) as u64);
            if info.stale {
                Span::styled(format!("stale {}", age), Style::default().fg(theme.error))
            } else {
                Span::styled(format!("updated {} ago", age), Style::default().fg(theme.success))
            }
        }
    }
}

/// Gauge label, e.g. "2/5 busy · 3 available · 2 live · 4 scheduled".
pub fn summary_label(summary: &NetworkSummary) -> String {
    let mut label = format!(
        "{}/{} busy · {} available · {} live · {} scheduled",
        summary.busy_now,
        summary.total_locations,
        summary.available_now,
        summary.live_jobs,
        summary.scheduled_jobs
    );
    if summary.oversubscribed > 0 {
        label.push_str(&format!(" · {} oversubscribed", summary.oversubscribed));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_label() {
        let mut summary = NetworkSummary {
            total_locations: 5,
            available_now: 3,
            busy_now: 2,
            live_jobs: 2,
            scheduled_jobs: 4,
            ..Default::default()
        };
        assert_eq!(
            summary_label(&summary),
            "2/5 busy · 3 available · 2 live · 4 scheduled"
        );
        summary.oversubscribed = 1;
        assert!(summary_label(&summary).ends_with("· 1 oversubscribed"));
    }
}
