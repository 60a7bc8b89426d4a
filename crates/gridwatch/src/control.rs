//! Simulation clock control.

use chrono::{DateTime, Duration, Utc};
use gridwatch_client::StatusSource;
use gridwatch_state::{SimClock, StepDirection};
use std::sync::Arc;
use tracing::{info, warn};

/// Step the simulation clock one step in `direction`.
///
/// The backend owns the simulation time, so it is asked first and the local
/// clock is synced to its answer. When the backend cannot step, the local
/// clock moves by `fallback` instead.
pub async fn step_clock(
    source: &dyn StatusSource,
    clock: &SimClock,
    direction: StepDirection,
    fallback: Duration,
) -> DateTime<Utc> {
    let result = match direction {
        StepDirection::Forward => source.step_forward().await,
        StepDirection::Backward => source.step_backward().await,
    };

    match result {
        Ok(time) => {
            clock.sync_to(time);
            time
        }
        Err(e) => {
            warn!(
                "Backend could not step the clock {} ({}), stepping locally",
                direction.label(),
                e
            );
            clock.step_toward(direction, fallback)
        }
    }
}

/// Align the clock with the backend's simulation time once at startup.
pub async fn sync_clock(source: Arc<dyn StatusSource>, clock: Arc<SimClock>) {
    match source.simulation_time().await {
        Ok(time) => {
            clock.sync_to(time);
            info!("Synced to simulation time {}", time);
        }
        Err(e) => info!("No simulation time from backend ({}), using wall clock", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeSource;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_step_uses_backend_time() {
        let source = FakeSource::default();
        source.set_clock(Some(base() + Duration::hours(6)));
        let clock = SimClock::fixed(base());

        let now = step_clock(&source, &clock, StepDirection::Forward, Duration::hours(1)).await;
        assert_eq!(now, base() + Duration::hours(6));
        assert_eq!(clock.now(), base() + Duration::hours(6));
    }

    #[tokio::test]
    async fn test_step_falls_back_to_local_clock() {
        let source = FakeSource::default();
        let clock = SimClock::fixed(base());

        let now = step_clock(&source, &clock, StepDirection::Backward, Duration::hours(2)).await;
        assert_eq!(now, base() - Duration::hours(2));
        assert_eq!(clock.now(), base() - Duration::hours(2));
    }

    #[tokio::test]
    async fn test_sync_clock() {
        let source = FakeSource::default();
        source.set_clock(Some(base() + Duration::minutes(30)));
        let clock = Arc::new(SimClock::fixed(base()));

        sync_clock(Arc::new(source), Arc::clone(&clock)).await;
        assert_eq!(clock.now(), base() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_sync_clock_without_backend_time() {
        let clock = Arc::new(SimClock::fixed(base()));
        sync_clock(Arc::new(FakeSource::default()), Arc::clone(&clock)).await;
        assert_eq!(clock.now(), base());
    }
}
