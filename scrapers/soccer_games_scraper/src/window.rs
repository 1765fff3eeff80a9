use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

use crate::kickoff::{jst_now, KickoffJst};

/// Days ahead kept by the fetch stages and the combined feed.
pub const FETCH_WINDOW_DAYS: i64 = 7;
/// Days ahead kept when re-merging a single competition into the feed.
pub const REMERGE_WINDOW_DAYS: i64 = 21;

/// Inclusive range of JST wall-clock kickoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// From the last second of yesterday (JST) up to `days_ahead` days from now.
    pub fn rolling(now: DateTime<Utc>, days_ahead: i64) -> Self {
        let now_jst = jst_now(now);
        let yesterday = now_jst.date() - Duration::days(1);
        let end_of_yesterday = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);

        Self {
            start: yesterday.and_time(end_of_yesterday),
            end: now_jst + Duration::days(days_ahead),
        }
    }

    pub fn contains(&self, kickoff: &KickoffJst) -> bool {
        let naive = kickoff.naive();
        naive >= self.start && naive <= self.end
    }
}
