//! Discovery view: which agents searched for grid capacity and what they found.

use crate::app::Tab;
use crate::components::ViewTabs;
use crate::ui::Theme;
use chrono::{DateTime, Utc};
use gridwatch_parsers::{format_duration, short_id};
use gridwatch_state::{AgentDiscovery, DiscoverySnapshot};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Row, Table, TableState},
};

pub struct DiscoveryView;

impl DiscoveryView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        snapshot: &DiscoverySnapshot,
        selected: usize,
        now: DateTime<Utc>,
        theme: &Theme,
    ) {
        let header = Row::new(vec![
            "Agent", "Region", "Location", "Runs", "Last", "Cities", "Found", "Catalog",
        ])
        .style(
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

        let rows: Vec<Row> = snapshot
            .agents
            .iter()
            .map(|agent| agent_row(agent, now, theme))
            .collect();

        let mut title = ViewTabs::title_line(Tab::Discovery);
        title.spans.push(Span::styled(
            format!(
                "({} agents · {} active · {} discoveries) ",
                snapshot.total_agents,
                snapshot.active_agents(),
                snapshot.total_discoveries()
            ),
            Style::default().fg(theme.muted),
        ));

        let table = Table::new(
            rows,
            [
                Constraint::Min(16),    // Agent
                Constraint::Length(12), // Region
                Constraint::Length(14), // Location
                Constraint::Length(5),  // Runs
                Constraint::Length(8),  // Last
                Constraint::Length(20), // Cities
                Constraint::Length(6),  // Found
                Constraint::Length(18), // Catalog
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if !snapshot.agents.is_empty() {
            state.select(Some(selected.min(snapshot.agents.len() - 1)));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }
}

fn agent_row<'a>(agent: &'a AgentDiscovery, now: DateTime<Utc>, theme: &Theme) -> Row<'a> {
    let last = agent
        .last_discovery
        .map(|t| since(t, now))
        .unwrap_or_else(|| "-".to_string());

    let cities = recent_cities(&agent.cities, 3);

    let catalog = match &agent.latest_catalog {
        Some(c) if c.total_items > 0 => Line::from(Span::styled(
            format!("{}p {}i {:.0}g", c.providers, c.total_items, c.average_carbon),
            Style::default().fg(theme.carbon(c.average_carbon)),
        )),
        Some(c) => Line::from(Span::styled(
            format!("{}p empty", c.providers),
            Style::default().fg(theme.muted),
        )),
        None => Line::from(Span::styled("-", Style::default().fg(theme.muted))),
    };

    Row::new(vec![
        Line::from(Span::styled(
            short_id(&agent.agent_name, 24),
            Style::default().fg(theme.highlight),
        )),
        Line::from(agent.region.as_str()),
        Line::from(agent.assigned_location.as_deref().unwrap_or("-")),
        Line::from(Span::styled(
            agent.discovery_count.to_string(),
            Style::default().fg(if agent.discovery_count > 0 {
                theme.foreground
            } else {
                theme.muted
            }),
        )),
        Line::from(last),
        Line::from(cities),
        Line::from(agent.locations_found.to_string()),
        catalog,
    ])
}

/// "5m ago", or "in 2h" for timestamps ahead of the clock.
fn since(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - t).num_seconds();
    if secs >= 0 {
        format!("{} ago", format_duration(secs as u64))
    } else {
        format!("in {}", format_duration(secs.unsigned_abs()))
    }
}

/// Last `n` distinct cities, most recent first.
fn recent_cities(cities: &[String], n: usize) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for city in cities.iter().rev() {
        if !seen.contains(&city.as_str()) {
            seen.push(city);
        }
        if seen.len() == n {
            break;
        }
    }
    if seen.is_empty() {
        "-".to_string()
    } else {
        seen.join(", ")
    }
}
