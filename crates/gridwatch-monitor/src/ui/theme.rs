//! Color themes.

use gridwatch_state::{JobStatus, PeriodPhase};
use ratatui::style::Color;

pub struct Theme {
    pub foreground: Color,
    pub muted: Color,
    pub highlight: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub past: Color,
    pub live: Color,
    pub scheduled: Color,
    pub now_marker: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            foreground: Color::White,
            muted: Color::DarkGray,
            highlight: Color::Cyan,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            past: Color::DarkGray,
            live: Color::Yellow,
            scheduled: Color::Cyan,
            now_marker: Color::Red,
        }
    }

    pub fn light() -> Self {
        Self {
            foreground: Color::Black,
            muted: Color::Gray,
            highlight: Color::Blue,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Magenta,
            past: Color::Gray,
            live: Color::Magenta,
            scheduled: Color::Blue,
            now_marker: Color::Red,
        }
    }

    /// Theme by name; anything other than "light" is dark.
    pub fn by_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("light") {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn phase(&self, phase: PeriodPhase) -> Color {
        match phase {
            PeriodPhase::Past => self.past,
            PeriodPhase::Live => self.live,
            PeriodPhase::Scheduled => self.scheduled,
        }
    }

    pub fn job_status(&self, status: JobStatus) -> Color {
        match status {
            JobStatus::Completed => self.success,
            JobStatus::Assigned => self.scheduled,
            JobStatus::Failed => self.error,
            JobStatus::Pending | JobStatus::Unknown => self.warning,
        }
    }

    /// Green under 150 gCO2/kWh, yellow under 300, red above.
    pub fn carbon(&self, intensity: f64) -> Color {
        if intensity < 150.0 {
            self.success
        } else if intensity < 300.0 {
            self.warning
        } else {
            self.error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("LIGHT").foreground, Color::Black);
        assert_eq!(Theme::by_name("dark").foreground, Color::White);
        assert_eq!(Theme::by_name("solarized").foreground, Color::White);
    }

    #[test]
    fn test_carbon_bands() {
        let theme = Theme::dark();
        assert_eq!(theme.carbon(90.0), theme.success);
        assert_eq!(theme.carbon(200.0), theme.warning);
        assert_eq!(theme.carbon(450.0), theme.error);
    }

    #[test]
    fn test_job_status_colors() {
        let theme = Theme::light();
        assert_eq!(theme.job_status(JobStatus::Completed), theme.success);
        assert_eq!(theme.job_status(JobStatus::Assigned), theme.scheduled);
        assert_eq!(theme.job_status(JobStatus::Failed), theme.error);
        assert_eq!(theme.job_status(JobStatus::Pending), theme.warning);
    }
}
