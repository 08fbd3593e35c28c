use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How long measurements are kept before the cleanup job deletes them.
///
/// The policy stores a relative age, never an absolute date: the cutoff is
/// recomputed as `now − max_age` each time the cleanup job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub max_age_secs: u64,
}

impl RetentionPolicy {
    #[must_use]
    pub const fn from_hours(hours: u64) -> Self {
        Self {
            max_age_secs: hours * 3600,
        }
    }

    /// The absolute cutoff for a cleanup firing at `now`: everything strictly
    /// older is eligible for deletion.
    #[must_use]
    pub fn cutoff_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let secs = i64::try_from(self.max_age_secs).unwrap_or(i64::MAX);
        now - TimeDelta::seconds(secs)
    }
}
