//! Trailing time window used by recency queries.

use chrono::{DateTime, Duration, Utc};

/// Earliest creation time included in a `days`-day recency window.
///
/// `days == 0` means "since the start of the current (UTC) day"; any other
/// value is a trailing window of that many days ending at `now`.
pub fn recent_cutoff(days: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    if days == 0 {
        now.date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .unwrap_or(now)
    } else {
        now - Duration::days(i64::from(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zero_days_is_start_of_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 17, 42, 9).unwrap();
        let cutoff = recent_cutoff(0, now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_trailing_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 17, 42, 9).unwrap();
        assert_eq!(recent_cutoff(7, now), now - Duration::days(7));
        assert_eq!(recent_cutoff(1, now), now - Duration::days(1));
    }

    #[test]
    fn test_cutoff_never_after_now() {
        let now = Utc::now();
        for days in [0, 1, 30, 365] {
            assert!(recent_cutoff(days, now) <= now);
        }
    }
}
