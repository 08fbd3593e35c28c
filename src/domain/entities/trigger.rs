use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit of a trigger interval, from milliseconds up to years.
///
/// Months and years are calendar-free approximations (30 and 365 days) —
/// probe cadences at that scale do not need calendar arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        match self {
            Self::Millisecond => 1,
            Self::Second => 1_000,
            Self::Minute => 60_000,
            Self::Hour => 3_600_000,
            Self::Day => 86_400_000,
            Self::Week => 7 * 86_400_000,
            Self::Month => 30 * 86_400_000,
            Self::Year => 365 * 86_400_000,
        }
    }
}

/// How often a monitored process is probed, with optional start/end bounds.
///
/// One `TriggerConfig` belongs to exactly one scheduled job; replacing it
/// means rescheduling the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub every: u64,
    pub unit: IntervalUnit,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TriggerConfig {
    #[must_use]
    pub const fn new(every: u64, unit: IntervalUnit) -> Self {
        Self {
            every,
            unit,
            start: None,
            end: None,
        }
    }

    /// The tick interval as a `Duration`. Zero-length intervals clamp to
    /// 1 ms so a misconfigured trigger cannot spin the timer.
    #[must_use]
    pub fn interval(&self) -> Duration {
        let millis = self.every.saturating_mul(self.unit.as_millis());
        Duration::from_millis(millis.max(1))
    }

    /// Whether the trigger's end bound (if any) has passed at `now`.
    #[must_use]
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end.is_some_and(|end| now >= end)
    }
}
