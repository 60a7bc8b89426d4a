//! Utilization aggregates per location and across the network.

use crate::types::{LocationTimeline, NetworkSummary, Period};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Utilization at or above which a location counts as busy.
pub const BUSY_THRESHOLD: u8 = 80;

/// 100 if any period covers `now`, else 0.
///
/// Overlapping periods are tolerated; one covering period is enough.
pub fn current_utilization(periods: &[Period], now: DateTime<Utc>) -> u8 {
    if periods.iter().any(|p| p.covers(now)) {
        100
    } else {
        0
    }
}

/// Number of periods covering `now`.
///
/// Exposed next to [`current_utilization`] so callers can tell a busy
/// location from an oversubscribed one.
pub fn concurrent_jobs(periods: &[Period], now: DateTime<Utc>) -> usize {
    periods.iter().filter(|p| p.covers(now)).count()
}

/// Reduce all locations to network-wide counts at `now`.
///
/// Utilization is derived from the periods, not the poll-time fields, so the
/// summary agrees with anything else rendered for the same `now`.
pub fn summarize(timelines: &[LocationTimeline], now: DateTime<Utc>) -> NetworkSummary {
    let mut summary = NetworkSummary {
        total_locations: timelines.len(),
        ..Default::default()
    };

    let mut utilization_sum = 0u64;
    for timeline in timelines {
        let utilization = timeline.utilization_at(now);
        utilization_sum += u64::from(utilization);
        if utilization == 0 {
            summary.available_now += 1;
        }
        if utilization >= BUSY_THRESHOLD {
            summary.busy_now += 1;
        }
        if timeline.is_oversubscribed_at(now) {
            summary.oversubscribed += 1;
        }
        summary.total_jobs += timeline.total_jobs();
        for period in &timeline.periods {
            if period.covers(now) {
                summary.live_jobs += 1;
            } else if period.start > now {
                summary.scheduled_jobs += 1;
            }
        }
    }

    summary.average_utilization = if timelines.is_empty() {
        0.0
    } else {
        utilization_sum as f64 / timelines.len() as f64
    };

    summary
}

/// Per-region rollup of location state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: String,
    pub locations: usize,
    pub busy: usize,
    pub average_utilization: f64,
    pub average_carbon: f64,
    pub average_renewable: f64,
    /// Mean price over locations that report one
    pub average_price: Option<f64>,
}

/// Group locations by region, in order of first appearance, with
/// utilization taken at `now`.
pub fn summarize_regions(
    timelines: &[LocationTimeline],
    now: DateTime<Utc>,
) -> Vec<RegionSummary> {
    let mut order: Vec<&str> = Vec::new();
    for timeline in timelines {
        if !order.contains(&timeline.region.as_str()) {
            order.push(&timeline.region);
        }
    }

    order
        .into_iter()
        .map(|region| {
            let members: Vec<&LocationTimeline> =
                timelines.iter().filter(|t| t.region == region).collect();
            let n = members.len() as f64;
            let prices: Vec<f64> = members.iter().filter_map(|t| t.signals.price).collect();

            RegionSummary {
                region: region.to_string(),
                locations: members.len(),
                busy: members
                    .iter()
                    .filter(|t| t.utilization_at(now) >= BUSY_THRESHOLD)
                    .count(),
                average_utilization: members
                    .iter()
                    .map(|t| f64::from(t.utilization_at(now)))
                    .sum::<f64>()
                    / n,
                average_carbon: members.iter().map(|t| t.signals.carbon_intensity).sum::<f64>() / n,
                average_renewable: members.iter().map(|t| t.signals.renewable_mix).sum::<f64>() / n,
                average_price: if prices.is_empty() {
                    None
                } else {
                    Some(prices.iter().sum::<f64>() / prices.len() as f64)
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobStatus, LocationSignals};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn period(id: &str, start_h: i64, end_h: i64) -> Period {
        Period {
            start: now() + Duration::hours(start_h),
            end: now() + Duration::hours(end_h),
            utilization: 100,
            carbon_intensity: 0.0,
            renewable_mix: 0.0,
            active_jobs: vec![id.to_string()],
            priority: None,
            status: JobStatus::Assigned,
            duration_hrs: (end_h - start_h) as f64,
            submitted_at: None,
            must_start_by: None,
        }
    }

    fn timeline(location: &str, region: &str, periods: Vec<Period>) -> LocationTimeline {
        LocationTimeline {
            location: location.to_string(),
            region: region.to_string(),
            agent_name: format!("{location} Node"),
            signals: LocationSignals::default(),
            current_utilization: current_utilization(&periods, now()),
            concurrent_jobs: concurrent_jobs(&periods, now()),
            periods,
        }
    }

    #[test]
    fn test_current_utilization() {
        assert_eq!(current_utilization(&[], now()), 0);
        assert_eq!(current_utilization(&[period("a", -1, 1)], now()), 100);
        assert_eq!(current_utilization(&[period("a", 1, 2)], now()), 0);
        assert_eq!(current_utilization(&[period("a", -3, -2)], now()), 0);
        // Boundaries are inclusive
        assert_eq!(current_utilization(&[period("a", 0, 1)], now()), 100);
        assert_eq!(current_utilization(&[period("a", -1, 0)], now()), 100);
    }

    #[test]
    fn test_overlap_is_flag_not_count() {
        let periods = vec![period("a", -2, 2), period("b", -1, 1)];
        assert_eq!(current_utilization(&periods, now()), 100);
        assert_eq!(concurrent_jobs(&periods, now()), 2);

        let single = vec![period("a", -2, 2)];
        assert_eq!(current_utilization(&single, now()), 100);
        assert_eq!(concurrent_jobs(&single, now()), 1);

        assert!(timeline("X", "R", periods).is_oversubscribed_at(now()));
        assert!(!timeline("Y", "R", single).is_oversubscribed_at(now()));
    }

    #[test]
    fn test_summarize_empty_network() {
        let summary = summarize(&[], now());
        assert_eq!(summary.total_locations, 0);
        assert_eq!(summary.available_now, 0);
        assert_eq!(summary.busy_now, 0);
        assert_eq!(summary.average_utilization, 0.0);
        assert!(!summary.average_utilization.is_nan());
    }

    #[test]
    fn test_summarize_counts() {
        let timelines = vec![
            timeline("Leeds", "North", vec![period("a", -1, 1), period("b", 30, 31)]),
            timeline("Bristol", "South West", vec![period("c", 2, 3)]),
            timeline("Exeter", "South West", vec![]),
            timeline("Glasgow", "Scotland", vec![period("d", -5, -4)]),
        ];
        let summary = summarize(&timelines, now());
        assert_eq!(summary.total_locations, 4);
        assert_eq!(summary.available_now, 3);
        assert_eq!(summary.busy_now, 1);
        assert_eq!(summary.average_utilization, 25.0);
        // Out-of-window job b still counts
        assert_eq!(summary.total_jobs, 4);
        assert_eq!(summary.live_jobs, 1);
        assert_eq!(summary.scheduled_jobs, 2);
        assert_eq!(summary.oversubscribed, 0);
    }

    #[test]
    fn test_summarize_regions() {
        let mut leeds = timeline("Leeds", "North", vec![period("a", -1, 1)]);
        leeds.signals.price = Some(0.2);
        leeds.signals.carbon_intensity = 100.0;
        let mut manchester = timeline("Manchester", "North", vec![]);
        manchester.signals.price = Some(0.4);
        manchester.signals.carbon_intensity = 300.0;
        let exeter = timeline("Exeter", "South West", vec![]);

        let regions = summarize_regions(&[leeds, exeter, manchester], now());
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, "North");
        assert_eq!(regions[0].locations, 2);
        assert_eq!(regions[0].busy, 1);
        assert_eq!(regions[0].average_utilization, 50.0);
        assert_eq!(regions[0].average_carbon, 200.0);
        assert!((regions[0].average_price.unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(regions[1].region, "South West");
        assert_eq!(regions[1].average_price, None);
    }

    #[test]
    fn test_summary_follows_clock_after_poll() {
        // Built at now: Leeds busy, Bristol idle
        let timelines = vec![
            timeline("Leeds", "North", vec![period("a", -1, 1)]),
            timeline("Bristol", "South West", vec![period("b", 2, 4)]),
        ];
        assert_eq!(timelines[0].current_utilization, 100);

        // Three hours later without a new poll
        let later = now() + Duration::hours(3);
        let summary = summarize(&timelines, later);
        assert_eq!(summary.busy_now, 1);
        assert_eq!(summary.available_now, 1);
        assert_eq!(summary.live_jobs, 1);
        assert_eq!(summary.scheduled_jobs, 0);

        let regions = summarize_regions(&timelines, later);
        assert_eq!(regions[0].busy, 0);
        assert_eq!(regions[1].busy, 1);
        assert_eq!(regions[1].average_utilization, 100.0);
    }
}
