use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

static CREATION_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Creation Date:\s*(\d{4}-\d{2}-\d{2})")
        .expect("creation date pattern is valid")
});

/// First `Creation Date: YYYY-MM-DD` found in a WHOIS response, matched
/// case-insensitively. Anything after the date (time, zone) is ignored.
pub fn creation_date(response: &str) -> Option<NaiveDate> {
    let captures = CREATION_DATE.captures(response)?;
    NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()
}

/// Whole days between midnight UTC of `created` and `now`, rounded to the
/// nearest day. Creation dates in the future count as age zero.
pub fn age_in_days(created: NaiveDate, now: DateTime<Utc>) -> i64 {
    let created_at = created.and_time(chrono::NaiveTime::MIN).and_utc();
    let seconds = (now - created_at).num_seconds() as f64;
    let days = (seconds / 86_400.0).round() as i64;
    days.max(0)
}
