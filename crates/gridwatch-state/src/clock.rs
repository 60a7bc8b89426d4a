//! Clock source with a steppable simulation offset.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Direction of an operator clock step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

impl StepDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ClockBase {
    Wall,
    Fixed(DateTime<Utc>),
}

/// Current time as seen by the monitor.
///
/// Wall-clock time (or a fixed instant in tests) plus a simulated offset in
/// milliseconds. The offset moves in discrete steps issued by the operator or
/// is synced to the simulation time reported by the backend. Shared between
/// the UI thread and the polling tasks behind an `Arc`.
#[derive(Debug)]
pub struct SimClock {
    base: ClockBase,
    offset_ms: AtomicI64,
}

impl SimClock {
    /// A clock following wall-clock time.
    pub fn wall() -> Self {
        Self {
            base: ClockBase::Wall,
            offset_ms: AtomicI64::new(0),
        }
    }

    /// A clock frozen at `at`. Steps still move it.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self {
            base: ClockBase::Fixed(at),
            offset_ms: AtomicI64::new(0),
        }
    }

    fn base_now(&self) -> DateTime<Utc> {
        match self.base {
            ClockBase::Wall => Utc::now(),
            ClockBase::Fixed(at) => at,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let base = self.base_now();
        base.checked_add_signed(self.offset()).unwrap_or(base)
    }

    /// Distance between simulated and real time.
    pub fn offset(&self) -> Duration {
        Duration::milliseconds(self.offset_ms.load(Ordering::SeqCst))
    }

    pub fn is_simulated(&self) -> bool {
        self.offset_ms.load(Ordering::SeqCst) != 0
    }

    /// Move the clock by `delta` (negative to go back). Returns the new time.
    pub fn step(&self, delta: Duration) -> DateTime<Utc> {
        let delta_ms = delta.num_milliseconds();
        let _ = self
            .offset_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |ms| {
                Some(ms.saturating_add(delta_ms))
            });
        self.now()
    }

    pub fn step_forward(&self, step: Duration) -> DateTime<Utc> {
        self.step(step)
    }

    pub fn step_backward(&self, step: Duration) -> DateTime<Utc> {
        self.step(-step)
    }

    pub fn step_toward(&self, direction: StepDirection, step: Duration) -> DateTime<Utc> {
        match direction {
            StepDirection::Forward => self.step_forward(step),
            StepDirection::Backward => self.step_backward(step),
        }
    }

    /// Align the clock with a simulation time reported by the backend.
    pub fn sync_to(&self, simulated: DateTime<Utc>) {
        let offset = simulated - self.base_now();
        self.offset_ms
            .store(offset.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::wall()
    }
}
