//! Jobs view: the compute job submission queue.

use crate::app::Tab;
use crate::components::ViewTabs;
use crate::ui::Theme;
use gridwatch_parsers::{format_hours, short_id};
use gridwatch_state::{JobQueueSnapshot, JobStatus, QueuedJob};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

pub struct JobsView;

impl JobsView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        snapshot: &JobQueueSnapshot,
        selected: usize,
        theme: &Theme,
    ) {
        let mut title = ViewTabs::title_line(Tab::Jobs);
        title.spans.push(Span::styled(
            format!(
                "({} jobs · {} pending · {} assigned · {} completed · {} failed) ",
                snapshot.jobs.len(),
                snapshot.count(JobStatus::Pending),
                snapshot.count(JobStatus::Assigned),
                snapshot.count(JobStatus::Completed),
                snapshot.count(JobStatus::Failed),
            ),
            Style::default().fg(theme.muted),
        ));
        let block = Block::default().borders(Borders::ALL).title(title);

        if snapshot.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No jobs submitted yet.",
                Style::default().fg(theme.muted),
            )))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(vec!["Job ID", "Runtime", "Priority", "Status"]).style(
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

        let rows: Vec<Row> = snapshot.jobs.iter().map(|job| job_row(job, theme)).collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(12), // Job ID
                Constraint::Length(9),  // Runtime
                Constraint::Length(9),  // Priority
                Constraint::Min(14),    // Status
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        state.select(Some(selected.min(snapshot.jobs.len() - 1)));
        frame.render_stateful_widget(table, area, &mut state);
    }
}

fn job_row<'a>(job: &'a QueuedJob, theme: &Theme) -> Row<'a> {
    let runtime = job
        .runtime_hrs
        .map(format_hours)
        .unwrap_or_else(|| "-".to_string());
    let priority = job
        .priority
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    Row::new(vec![
        Line::from(Span::styled(
            short_id(&job.job_id, 8),
            Style::default().fg(theme.highlight),
        )),
        Line::from(runtime),
        Line::from(priority),
        Line::from(Span::styled(
            format!("{} {}", job.status.symbol(), job.status.label()),
            Style::default().fg(theme.job_status(job.status)),
        )),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(snapshot: &JobQueueSnapshot) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal
            .draw(|frame| JobsView::render(frame, frame.area(), snapshot, 0, &Theme::dark()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_queue() {
        let snapshot = JobQueueSnapshot {
            jobs: vec![
                QueuedJob {
                    job_id: "6f1c2a9e-77aa-4c1e".to_string(),
                    status: JobStatus::Assigned,
                    runtime_hrs: Some(1.5),
                    priority: Some(3),
                },
                QueuedJob {
                    job_id: "b3".to_string(),
                    status: JobStatus::Pending,
                    runtime_hrs: None,
                    priority: None,
                },
            ],
        };
        let text = render(&snapshot);

        assert!(text.contains("[Jobs]"));
        assert!(text.contains("2 jobs"));
        assert!(text.contains("1 pending"));
        assert!(text.contains("6f1c2a9e…"));
        assert!(text.contains("1.5h"));
        assert!(text.contains("ASSIGNED"));
    }

    #[test]
    fn test_render_empty_queue() {
        let text = render(&JobQueueSnapshot::default());
        assert!(text.contains("No jobs submitted yet."));
    }
}
