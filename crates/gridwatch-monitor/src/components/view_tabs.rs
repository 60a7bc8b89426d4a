//! View tabs component - generates title with inline tab selection.

use crate::app::Tab;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub struct ViewTabs;

impl ViewTabs {
    /// Title line like " [Timeline] Dashboard Discovery Jobs ".
    pub fn title_line(active: Tab) -> Line<'static> {
        let mut spans = vec![Span::raw(" ")];

        for (i, tab) in Tab::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            if *tab == active {
                spans.push(Span::styled(
                    format!("[{}]", tab.label()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(
                    tab.label().to_string(),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }

        spans.push(Span::raw(" "));
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_active_tab_is_bracketed() {
        assert_eq!(
            text(&ViewTabs::title_line(Tab::Dashboard)),
            " Timeline [Dashboard] Discovery Jobs "
        );
    }
}
