use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use regex::Regex;

static AGO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*([a-z]+)").unwrap());

/// Coarse listing ages ("30+ days ago") resolve to this many days back.
const OPEN_ENDED_DAYS: i64 = 30;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

/// Resolve a relative "posted" phrase ("Posted 2d ago", "yesterday",
/// "30+ days ago") against `now`. Only ever subtracts, so the result is never
/// after `now`'s date. Unrecognised text gives `None`.
pub fn resolve(text: Option<&str>, now: NaiveDateTime) -> Option<NaiveDate> {
    let text = text?.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    let delta = if text.contains("30+") {
        TimeDelta::try_days(OPEN_ENDED_DAYS)?
    } else if text.contains("today") {
        TimeDelta::zero()
    } else if text.contains("yesterday") {
        TimeDelta::try_days(1)?
    } else {
        let caps = AGO_RE.captures(&text)?;
        let n: i64 = caps[1].parse().ok()?;
        unit_delta(&caps[2], n)?
    };

    now.checked_sub_signed(delta).map(|t| t.date())
}

/// Unit words are matched by containment. Month spellings ("mo", "mon",
/// "month", "mth") also contain 'h' or 'm', so they are tested first.
fn unit_delta(unit: &str, n: i64) -> Option<TimeDelta> {
    if unit.starts_with("mo") || unit.starts_with("mth") {
        TimeDelta::try_days(n.checked_mul(DAYS_PER_MONTH)?)
    } else if unit.contains('h') {
        TimeDelta::try_hours(n)
    } else if unit.contains('d') {
        TimeDelta::try_days(n)
    } else if unit.contains('w') {
        TimeDelta::try_weeks(n)
    } else if unit.contains('m') {
        TimeDelta::try_minutes(n)
    } else if unit.contains('y') {
        TimeDelta::try_days(n.checked_mul(DAYS_PER_YEAR)?)
    } else {
        None
    }
}
