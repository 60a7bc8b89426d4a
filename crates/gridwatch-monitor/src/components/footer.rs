//! Footer: key hints or a transient status message, poll failures, version.

use crate::ui::Theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = "Tab:view  [/]:step clock  R:refresh  r:region  j/k:scroll  ?:help  q:quit";

pub struct Footer;

impl Footer {
    /// `failures` is the active view's count of consecutive failed polls.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        status_message: Option<&str>,
        failures: u32,
        theme: &Theme,
    ) {
        let mut right = vec![];
        if let Some(label) = failure_label(failures) {
            right.push(Span::styled(
                label,
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ));
            right.push(Span::raw(" "));
        }
        right.push(Span::styled(
            format!("v{}", VERSION),
            Style::default().fg(theme.muted),
        ));
        let right = Line::from(right);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(right.width() as u16 + 1),
            ])
            .split(area);

        let left = match status_message {
            Some(msg) => Span::styled(
                msg.to_string(),
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(HELP, Style::default().fg(theme.muted)),
        };

        frame.render_widget(Paragraph::new(Line::from(left)), chunks[0]);
        frame.render_widget(Paragraph::new(right), chunks[1]);
    }
}

fn failure_label(failures: u32) -> Option<String> {
    match failures {
        0 => None,
        1 => Some("1 poll failed".to_string()),
        n => Some(format!("{} polls failed", n)),
    }
}
