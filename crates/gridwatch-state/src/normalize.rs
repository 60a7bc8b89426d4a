//! Schedule normalization: raw job records to ordered periods.

use crate::types::{Job, JobStatus, LocationSignals, Period};
use chrono::{DateTime, Duration, Utc};
use gridwatch_core::RawJob;
use gridwatch_parsers::parse_timestamp;
use serde::Serialize;

/// Shortest duration a period may have.
pub const MIN_DURATION: Duration = Duration::minutes(1);

/// Duration assumed when a job carries neither `end_time` nor `duration_hrs`.
const DEFAULT_DURATION_HRS: f64 = 1.0;

/// What was wrong with a job record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IssueKind {
    /// No `job_id`; a positional placeholder was used
    MissingJobId,
    /// No `start_time`; `now` was used
    MissingStart,
    /// A timestamp field could not be parsed
    UnparseableTimestamp { field: &'static str, value: String },
    /// `duration_hrs` was not a positive finite number
    InvalidDuration { hours: f64 },
    /// `end_time` was not after `start_time`
    EndNotAfterStart,
    /// `priority` outside 1..=5
    PriorityOutOfRange { priority: i64 },
    /// Unrecognised `status` string
    UnknownStatus { status: String },
}

/// One data-quality finding for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleIssue {
    pub location: String,
    pub job_id: String,
    pub kind: IssueKind,
}

/// Data-quality findings collected while normalizing a payload.
///
/// Bad records are repaired and kept; this is where the repairs show up.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQuality {
    pub issues: Vec<ScheduleIssue>,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    fn record(&mut self, location: &str, job_id: &str, kind: IssueKind) {
        tracing::warn!(location, job_id, issue = ?kind, "Repaired malformed job record");
        self.issues.push(ScheduleIssue {
            location: location.to_string(),
            job_id: job_id.to_string(),
            kind,
        });
    }
}

/// Normalize one location's job schedule.
///
/// Every record yields exactly one period; the result is sorted by start and
/// keeps input order for equal starts.
pub fn normalize_schedule(
    location: &str,
    jobs: &[RawJob],
    signals: &LocationSignals,
    now: DateTime<Utc>,
    quality: &mut DataQuality,
) -> Vec<Period> {
    let mut periods: Vec<Period> = jobs
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let job = normalize_job(location, index, raw, now, quality);
            Period::from_job(job, signals)
        })
        .collect();

    // sort_by_key is stable
    periods.sort_by_key(|p| p.start);
    periods
}

/// Validate one raw job, applying the defaulting rules.
pub fn normalize_job(
    location: &str,
    index: usize,
    raw: &RawJob,
    now: DateTime<Utc>,
    quality: &mut DataQuality,
) -> Job {
    let job_id = match raw.job_id.as_deref().and_then(gridwatch_parsers::non_empty_string) {
        Some(id) => id,
        None => {
            let placeholder = format!("job-{index}");
            quality.record(location, &placeholder, IssueKind::MissingJobId);
            placeholder
        }
    };

    let start = match raw.start_time.as_deref() {
        Some(s) => parse_or_record(location, &job_id, "start_time", s, quality).unwrap_or(now),
        None => {
            quality.record(location, &job_id, IssueKind::MissingStart);
            now
        }
    };

    let duration_hrs = match raw.duration_hrs {
        Some(hours) if hours.is_finite() && hours > 0.0 => hours,
        Some(hours) => {
            quality.record(location, &job_id, IssueKind::InvalidDuration { hours });
            MIN_DURATION.num_seconds() as f64 / 3600.0
        }
        None => DEFAULT_DURATION_HRS,
    };

    let explicit_end = raw
        .end_time
        .as_deref()
        .and_then(|s| parse_or_record(location, &job_id, "end_time", s, quality));

    let end = match explicit_end {
        Some(end) if end > start => end,
        Some(_) => {
            quality.record(location, &job_id, IssueKind::EndNotAfterStart);
            start + MIN_DURATION
        }
        None => end_from_duration(start, duration_hrs),
    };

    let priority = raw.priority.map(|p| {
        if !(1..=5).contains(&p) {
            quality.record(location, &job_id, IssueKind::PriorityOutOfRange { priority: p });
        }
        p.clamp(1, 5) as u8
    });

    let status = match raw.status.as_deref() {
        Some(s) => JobStatus::parse(s).unwrap_or_else(|| {
            quality.record(
                location,
                &job_id,
                IssueKind::UnknownStatus {
                    status: s.to_string(),
                },
            );
            JobStatus::Unknown
        }),
        None => JobStatus::Unknown,
    };

    let submitted_at = raw
        .submitted_at
        .as_deref()
        .map(|s| parse_or_record(location, &job_id, "submitted_at", s, quality).unwrap_or(now));

    let must_start_by = raw
        .must_start_by
        .as_deref()
        .and_then(|s| parse_or_record(location, &job_id, "must_start_by", s, quality));

    Job {
        job_id,
        start,
        end,
        duration_hrs,
        priority,
        status,
        submitted_at,
        must_start_by,
    }
}

fn parse_or_record(
    location: &str,
    job_id: &str,
    field: &'static str,
    value: &str,
    quality: &mut DataQuality,
) -> Option<DateTime<Utc>> {
    match parse_timestamp(value) {
        Ok(dt) => Some(dt),
        Err(_) => {
            quality.record(
                location,
                job_id,
                IssueKind::UnparseableTimestamp {
                    field,
                    value: value.to_string(),
                },
            );
            None
        }
    }
}

fn end_from_duration(start: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    let millis = (hours * 3_600_000.0).round();
    let duration = if millis >= i64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::milliseconds(millis as i64).max(MIN_DURATION)
    };
    start
        .checked_add_signed(duration)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn raw(id: &str, start: &str, duration: f64) -> RawJob {
        RawJob {
            job_id: Some(id.to_string()),
            start_time: Some(start.to_string()),
            duration_hrs: Some(duration),
            priority: Some(3),
            status: Some("ASSIGNED".to_string()),
            ..Default::default()
        }
    }

    fn normalize(jobs: &[RawJob]) -> (Vec<Period>, DataQuality) {
        let mut quality = DataQuality::default();
        let periods = normalize_schedule(
            "Leeds",
            jobs,
            &LocationSignals::default(),
            now(),
            &mut quality,
        );
        (periods, quality)
    }

    #[test]
    fn test_empty_schedule() {
        let (periods, quality) = normalize(&[]);
        assert!(periods.is_empty());
        assert!(quality.is_clean());
    }

    #[test]
    fn test_sorted_by_start() {
        let jobs = vec![
            raw("c", "2025-01-15T18:00:00", 1.0),
            raw("a", "2025-01-15T06:00:00", 1.0),
            raw("b", "2025-01-15T12:00:00", 1.0),
        ];
        let (periods, quality) = normalize(&jobs);
        let ids: Vec<_> = periods.iter().filter_map(|p| p.job_id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(quality.is_clean());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let jobs = vec![
            raw("late", "2025-01-15T20:00:00", 1.0),
            raw("first", "2025-01-15T10:00:00", 1.0),
            raw("second", "2025-01-15T10:00:00", 3.0),
            raw("third", "2025-01-15T10:00:00", 2.0),
        ];
        let (periods, _) = normalize(&jobs);
        let ids: Vec<_> = periods.iter().filter_map(|p| p.job_id()).collect();
        assert_eq!(ids, vec!["first", "second", "third", "late"]);
    }

    #[test]
    fn test_one_period_per_job() {
        let jobs: Vec<RawJob> = (0..25)
            .map(|i| raw(&format!("job{i}"), &format!("2025-01-15T{:02}:00:00", (i * 7) % 24), 1.0))
            .collect();
        let (periods, _) = normalize(&jobs);
        assert_eq!(periods.len(), jobs.len());
        assert!(periods.windows(2).all(|w| w[0].start <= w[1].start));

        let mut ids: Vec<_> = periods.iter().filter_map(|p| p.job_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), jobs.len());
    }

    #[test]
    fn test_end_defaults_from_duration() {
        let (periods, _) = normalize(&[raw("a", "2025-01-15T10:00:00", 2.5)]);
        let p = &periods[0];
        assert_eq!(p.end - p.start, Duration::minutes(150));
        assert_eq!(p.duration_hrs, 2.5);
    }

    #[test]
    fn test_missing_duration_defaults_to_one_hour() {
        let mut job = raw("a", "2025-01-15T10:00:00", 1.0);
        job.duration_hrs = None;
        let (periods, quality) = normalize(&[job]);
        assert_eq!(periods[0].duration(), Duration::hours(1));
        assert!(quality.is_clean());
    }

    #[test]
    fn test_explicit_end_wins() {
        let mut job = raw("a", "2025-01-15T10:00:00", 1.0);
        job.end_time = Some("2025-01-15T14:00:00".to_string());
        let (periods, _) = normalize(&[job]);
        assert_eq!(periods[0].duration(), Duration::hours(4));
    }

    #[test]
    fn test_unparseable_start_fails_open_to_now() {
        let job = raw("a", "not a time", 2.0);
        let (periods, quality) = normalize(&[job]);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, now());
        assert_eq!(periods[0].end, now() + Duration::hours(2));
        assert_eq!(quality.len(), 1);
        assert!(matches!(
            quality.issues[0].kind,
            IssueKind::UnparseableTimestamp { field: "start_time", .. }
        ));
        assert_eq!(quality.issues[0].location, "Leeds");
    }

    #[test]
    fn test_missing_start_uses_now() {
        let mut job = raw("a", "", 1.0);
        job.start_time = None;
        let (periods, quality) = normalize(&[job]);
        assert_eq!(periods[0].start, now());
        assert_eq!(quality.issues[0].kind, IssueKind::MissingStart);
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let (periods, quality) = normalize(&[raw("a", "2025-01-15T10:00:00", -3.0)]);
        assert_eq!(periods[0].duration(), MIN_DURATION);
        assert!(periods[0].end > periods[0].start);
        assert_eq!(quality.issues[0].kind, IssueKind::InvalidDuration { hours: -3.0 });
    }

    #[test]
    fn test_end_before_start_is_clamped() {
        let mut job = raw("a", "2025-01-15T10:00:00", 1.0);
        job.end_time = Some("2025-01-15T09:00:00".to_string());
        let (periods, quality) = normalize(&[job]);
        assert_eq!(periods[0].duration(), MIN_DURATION);
        assert_eq!(quality.issues[0].kind, IssueKind::EndNotAfterStart);
    }

    #[test]
    fn test_unparseable_end_falls_back_to_duration() {
        let mut job = raw("a", "2025-01-15T10:00:00", 2.0);
        job.end_time = Some("soon".to_string());
        let (periods, quality) = normalize(&[job]);
        assert_eq!(periods[0].duration(), Duration::hours(2));
        assert_eq!(quality.len(), 1);
    }

    #[test]
    fn test_priority_and_status_repair() {
        let mut job = raw("a", "2025-01-15T10:00:00", 1.0);
        job.priority = Some(9);
        job.status = Some("RUNNING".to_string());
        let (periods, quality) = normalize(&[job]);
        assert_eq!(periods[0].priority, Some(5));
        assert_eq!(periods[0].status, JobStatus::Unknown);
        assert_eq!(quality.len(), 2);
    }

    #[test]
    fn test_missing_job_id_gets_placeholder() {
        let mut job = raw("", "2025-01-15T10:00:00", 1.0);
        job.job_id = None;
        let (periods, quality) = normalize(&[raw("x", "2025-01-15T09:00:00", 1.0), job]);
        assert_eq!(periods[1].job_id(), Some("job-1"));
        assert_eq!(quality.issues[0].kind, IssueKind::MissingJobId);
    }

    #[test]
    fn test_signals_pass_through() {
        let signals = LocationSignals {
            carbon_intensity: 210.0,
            renewable_mix: 35.0,
            ..Default::default()
        };
        let mut quality = DataQuality::default();
        let periods = normalize_schedule(
            "Leeds",
            &[raw("a", "2025-01-15T10:00:00", 1.0)],
            &signals,
            now(),
            &mut quality,
        );
        let p = &periods[0];
        assert_eq!(p.carbon_intensity, 210.0);
        assert_eq!(p.renewable_mix, 35.0);
        assert_eq!(p.utilization, 100);
        assert_eq!(p.priority, Some(3));
        assert_eq!(p.status, JobStatus::Assigned);
    }
}
