use chrono::{Duration, Utc};

use atlas_admin_api::gate::TimeRemaining;

#[test]
fn countdown_decreases_and_terminates_at_end() {
    let base = Utc::now();
    let end = base + Duration::seconds(90);

    let mut previous = i64::MAX;
    for step in 0..9 {
        let now = base + Duration::seconds(step * 10);
        let remaining = TimeRemaining::until(end, now).expect("still before end");
        let total = remaining.total_seconds();
        assert!(total < previous);
        assert!(remaining.hours >= 0 && remaining.minutes >= 0 && remaining.seconds >= 0);
        previous = total;
    }

    // Terminal exactly at the end instant, and stays terminal after
    assert!(TimeRemaining::until(end, end).is_none());
    assert!(TimeRemaining::until(end, end + Duration::seconds(30)).is_none());
}

#[test]
fn countdown_format_matches_landing_page_contract() {
    let now = Utc::now();
    let end = now + Duration::hours(26) + Duration::minutes(3) + Duration::seconds(7);

    let remaining = TimeRemaining::until(end, now).unwrap();
    assert_eq!(remaining.to_string(), "26h 3m 7s");
}

#[test]
fn malformed_window_clamps_to_terminal() {
    // end before start reaches the countdown as an end already in the past
    let now = Utc::now();
    assert!(TimeRemaining::until(now - Duration::hours(2), now).is_none());
}
