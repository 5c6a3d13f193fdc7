//! Rolling time window value type
//!
//! Replaces ad hoc now-minus-N arithmetic with one boundary convention:
//! an instant is *within* a window when no more than the window's length
//! has elapsed, so "24h + 1s ago" is outside a 24h window while "exactly
//! 24h ago" is still inside.

use chrono::{DateTime, Duration, Utc};

/// A rolling window of fixed length, anchored at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    length: Duration,
}

impl TimeWindow {
    pub fn new(length: Duration) -> Self {
        Self { length }
    }

    pub fn hours(hours: i64) -> Self {
        Self::new(Duration::hours(hours))
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    pub fn seconds(seconds: i64) -> Self {
        Self::new(Duration::seconds(seconds))
    }

    /// Time elapsed between `since` and `now`
    pub fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        now - since
    }

    /// Whether `since` falls within this window ending at `now`
    pub fn within(&self, since: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        Self::elapsed(since, now) <= self.length
    }

    /// The instant where this window begins, looking back from `now`
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_boundary() {
        let window = TimeWindow::hours(24);
        let now = Utc::now();

        assert!(window.within(now - Duration::hours(23), now));
        // Exactly on the boundary still counts as within
        assert!(window.within(now - Duration::hours(24), now));
        // One second past the boundary does not
        assert!(!window.within(now - Duration::hours(24) - Duration::seconds(1), now));
    }

    #[test]
    fn test_elapsed() {
        let now = Utc::now();
        assert_eq!(
            TimeWindow::elapsed(now - Duration::seconds(61), now),
            Duration::seconds(61)
        );
    }

    #[test]
    fn test_start() {
        let window = TimeWindow::minutes(30);
        let now = Utc::now();
        assert_eq!(window.start(now), now - Duration::minutes(30));
    }
}
