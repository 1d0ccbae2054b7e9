//! Visibility rules applied when factories are listed or shown.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Most recent screenshots shown on a factory page.
pub const RECENT_SCREENSHOTS_LIMIT: i64 = 10;

/// Most recent problem reports shown on a factory page.
pub const RECENT_PROBLEMS_LIMIT: i64 = 10;

/// Freshness window and content threshold for factory views.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use chrono::{TimeZone, Utc};
/// use shotserver::domain::FactoryViewPolicy;
///
/// let policy = FactoryViewPolicy::new(Duration::from_secs(600), 0);
/// let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(policy.poll_cutoff(now), Utc.with_ymd_and_hms(2026, 1, 1, 11, 50, 0).unwrap());
/// assert!(policy.allows_profanities(0));
/// assert!(!policy.allows_profanities(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryViewPolicy {
    last_poll_timeout: Duration,
    profanities_allowed: i32,
}

impl FactoryViewPolicy {
    pub fn new(last_poll_timeout: Duration, profanities_allowed: i32) -> Self {
        Self {
            last_poll_timeout,
            profanities_allowed,
        }
    }

    pub fn last_poll_timeout(&self) -> Duration {
        self.last_poll_timeout
    }

    pub fn profanities_allowed(&self) -> i32 {
        self.profanities_allowed
    }

    /// Factories must have polled strictly after this instant to be listed.
    ///
    /// Windows too large for `chrono` saturate at the minimum timestamp.
    pub fn poll_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.last_poll_timeout)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether a website with `score` may be shown.
    pub fn allows_profanities(&self, score: i32) -> bool {
        score <= self.profanities_allowed
    }
}

impl Default for FactoryViewPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(600), 0)
    }
}
