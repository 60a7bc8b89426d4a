//! Projection of periods onto the sliding 48-hour window.

use crate::types::Period;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How far the window reaches into the past and into the future.
pub const WINDOW_HALF_SPAN: Duration = Duration::hours(24);

/// Total width of the window.
pub const WINDOW_SPAN: Duration = Duration::hours(48);

/// Where a period sits relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodPhase {
    /// Ended before now
    Past,
    /// Covers now
    Live,
    /// Starts after now
    Scheduled,
}

/// Horizontal placement of one period inside the window.
///
/// Fractions are of the full window width: `0.0` is `now - 24h`, `1.0` is
/// `now + 24h`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub left_fraction: f64,
    pub width_fraction: f64,
    pub is_future: bool,
    pub visible: bool,
    pub phase: PeriodPhase,
}

/// A labelled mark on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisTick {
    /// Hours relative to now
    pub offset_hours: i64,
    pub fraction: f64,
}

/// The viewing frame `[now - 24h, now + 24h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn around(now: DateTime<Utc>) -> Self {
        Self {
            start: now - WINDOW_HALF_SPAN,
            now,
            end: now + WINDOW_HALF_SPAN,
        }
    }

    /// Unclamped position of `t` as a fraction of the window.
    pub fn fraction_of(&self, t: DateTime<Utc>) -> f64 {
        let offset = t.signed_duration_since(self.start).num_milliseconds();
        offset as f64 / WINDOW_SPAN.num_milliseconds() as f64
    }

    /// Place one period in the window.
    ///
    /// Periods straddling the left edge are clipped to it; periods running
    /// past the right edge are cut so `left + width <= 1`. Periods entirely
    /// outside the window are invisible with zero width.
    pub fn project(&self, period: &Period) -> Projection {
        let raw_left = self.fraction_of(period.start);
        let raw_right = self.fraction_of(period.end);

        let straddles_left_edge = raw_left < 0.0 && raw_right > 0.0;
        let visible = (0.0..=1.0).contains(&raw_left) || straddles_left_edge;

        let left_fraction = raw_left.clamp(0.0, 1.0);
        let width_fraction = if visible {
            let right = raw_right.min(1.0);
            let width = (right - left_fraction).max(0.0);
            if left_fraction + width > 1.0 {
                1.0 - left_fraction
            } else {
                width
            }
        } else {
            0.0
        };

        let phase = if period.start > self.now {
            PeriodPhase::Scheduled
        } else if period.end < self.now {
            PeriodPhase::Past
        } else {
            PeriodPhase::Live
        };

        Projection {
            left_fraction,
            width_fraction,
            is_future: period.start > self.now,
            visible,
            phase,
        }
    }

    /// Axis marks from -24h to +24h every `step_hours`.
    pub fn ticks(step_hours: i64) -> Vec<AxisTick> {
        let half = WINDOW_HALF_SPAN.num_hours();
        let span = WINDOW_SPAN.num_hours() as f64;
        (-half..=half)
            .step_by(step_hours.max(1) as usize)
            .map(|offset_hours| AxisTick {
                offset_hours,
                fraction: (offset_hours + half) as f64 / span,
            })
            .collect()
    }
}

/// Project every period of one location against `now`.
pub fn project_periods(periods: &[Period], now: DateTime<Utc>) -> Vec<Projection> {
    let window = Window::around(now);
    periods.iter().map(|p| window.project(p)).collect()
}
