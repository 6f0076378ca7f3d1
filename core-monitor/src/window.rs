//! Detection window arithmetic.
//!
//! Each cycle looks back over the polling interval plus a fixed safety
//! margin. The margin absorbs provider indexing lag and clock skew, so
//! consecutive windows overlap heavily and a file is seen by several cycles.
//! Remediation is idempotent, which makes the repeated detection harmless.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::time::Duration;

/// Lower bound of a detection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Files created strictly after this instant are reported
    pub lower_bound: DateTime<Utc>,
}

impl TimeWindow {
    /// Window for a cycle starting at `now`: `now - (safety_margin + interval)`.
    ///
    /// With the default 120 minute margin and a 60 second interval the bound
    /// is 121 minutes before `now`.
    pub fn ending_at(now: DateTime<Utc>, interval: Duration, safety_margin: Duration) -> Self {
        let lookback = safety_margin.saturating_add(interval);
        let lookback = chrono::Duration::from_std(lookback).unwrap_or(chrono::Duration::MAX);

        Self {
            lower_bound: now
                .checked_sub_signed(lookback)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// RFC 3339 rendering with a `Z` suffix, e.g. `2023-02-16T07:59:00Z`
    pub fn rfc3339(&self) -> String {
        self.lower_bound.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "created after {}", self.rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MARGIN: Duration = Duration::from_secs(120 * 60);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 16, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_default_window() {
        let window = TimeWindow::ending_at(now(), Duration::from_secs(60), MARGIN);

        assert_eq!(
            window.lower_bound,
            Utc.with_ymd_and_hms(2023, 2, 16, 7, 59, 0).unwrap()
        );
        assert_eq!(window.rfc3339(), "2023-02-16T07:59:00Z");
    }

    #[test]
    fn test_fractional_minutes() {
        let window = TimeWindow::ending_at(now(), Duration::from_secs(90), MARGIN);
        assert_eq!(window.rfc3339(), "2023-02-16T07:58:30Z");
    }

    #[test]
    fn test_bound_never_later_than_margin() {
        let latest_allowed = now() - chrono::Duration::minutes(120);

        for secs in [1, 30, 60, 61, 300, 3600, 86_400] {
            let window = TimeWindow::ending_at(now(), Duration::from_secs(secs), MARGIN);
            assert!(window.lower_bound <= latest_allowed, "interval {}s", secs);
        }
    }

    #[test]
    fn test_bound_strictly_decreases_with_interval() {
        let bounds: Vec<_> = [1u64, 60, 61, 600, 3600]
            .iter()
            .map(|&secs| TimeWindow::ending_at(now(), Duration::from_secs(secs), MARGIN).lower_bound)
            .collect();

        assert!(bounds.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn test_subsecond_now_renders_whole_seconds() {
        let now = now() + chrono::Duration::milliseconds(250);
        let window = TimeWindow::ending_at(now, Duration::from_secs(60), MARGIN);

        assert_eq!(window.rfc3339(), "2023-02-16T07:59:00Z");
    }
}
