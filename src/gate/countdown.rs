use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whole hours/minutes/seconds left until a window ends, floored per unit.
///
/// `until` returns `None` once `now >= end`: the countdown never renders
/// negative units, including for malformed rows where `end <= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    pub fn until(end: DateTime<Utc>, now: DateTime<Utc>) -> Option<TimeRemaining> {
        let diff = (end - now).num_seconds();
        if diff <= 0 {
            return None;
        }

        Some(TimeRemaining {
            hours: diff / 3600,
            minutes: (diff % 3600) / 60,
            seconds: diff % 60,
        })
    }

    pub fn total_seconds(&self) -> i64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn floors_each_unit() {
        let now = Utc::now();
        let end = now + Duration::hours(2) + Duration::minutes(5) + Duration::seconds(30);

        let remaining = TimeRemaining::until(end, now).unwrap();
        assert_eq!(remaining.hours, 2);
        assert_eq!(remaining.minutes, 5);
        assert_eq!(remaining.seconds, 30);
    }

    #[test]
    fn renders_h_m_s() {
        let now = Utc::now();
        let end = now + Duration::seconds(3 * 3600 + 59 * 60 + 1);

        let remaining = TimeRemaining::until(end, now).unwrap();
        assert_eq!(remaining.to_string(), "3h 59m 1s");
    }

    #[test]
    fn terminal_exactly_at_end() {
        let now = Utc::now();
        assert!(TimeRemaining::until(now, now).is_none());
        assert!(TimeRemaining::until(now - Duration::seconds(1), now).is_none());
        assert!(TimeRemaining::until(now + Duration::seconds(1), now).is_some());
    }

    #[test]
    fn never_negative_for_malformed_end() {
        // A row with end before start reaches the countdown as an end in
        // the past; the terminal state applies immediately
        let now = Utc::now();
        assert!(TimeRemaining::until(now - Duration::hours(5), now).is_none());
    }

    #[test]
    fn strictly_decreases_as_time_passes() {
        let base = Utc::now();
        let end = base + Duration::minutes(10);

        let mut previous = i64::MAX;
        for step in 0..10 {
            let now = base + Duration::seconds(step * 30);
            let total = TimeRemaining::until(end, now).unwrap().total_seconds();
            assert!(total < previous, "remaining did not decrease at step {}", step);
            previous = total;
        }
    }

    #[test]
    fn large_windows_report_hours_beyond_a_day() {
        let now = Utc::now();
        let end = now + Duration::days(2);

        let remaining = TimeRemaining::until(end, now).unwrap();
        assert_eq!(remaining.hours, 48);
        assert_eq!(remaining.minutes, 0);
        assert_eq!(remaining.seconds, 0);
    }
}
