//! Relative time shorthand such as `"3h"`, `"7d"` or `"1d12h"`

use crate::granularity::{DAY_MS, HOUR_MS, MINUTE_MS, WEEK_MS};
use regex::Regex;
use std::sync::OnceLock;

fn whole_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:\d+[mhdw])+$").expect("valid regex"))
}

fn term_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)([mhdw])").expect("valid regex"))
}

/// Parse a relative duration into milliseconds.
///
/// Terms are summed, so `"1d12h"` is a day and a half. Returns `None` for
/// empty or malformed input and for durations that add up to zero.
pub fn parse_relative(input: &str) -> Option<i64> {
    let input = input.trim();
    if !whole_pattern().is_match(input) {
        return None;
    }

    let mut total: i64 = 0;
    for caps in term_pattern().captures_iter(input) {
        let amount: i64 = caps[1].parse().ok()?;
        let unit = match &caps[2] {
            "m" => MINUTE_MS,
            "h" => HOUR_MS,
            "d" => DAY_MS,
            "w" => WEEK_MS,
            _ => return None,
        };
        total = total.saturating_add(amount.saturating_mul(unit));
    }

    (total > 0).then_some(total)
}

/// Turn `startTime` / `endTime` / `since` input into absolute bounds.
///
/// A usable `since` wins over explicit bounds and yields `[now - since, now]`.
/// An unusable one is ignored and the explicit bounds pass through untouched,
/// leaving any defaulting to the granularity resolver.
pub fn absolute_bounds(
    start_time: Option<i64>,
    end_time: Option<i64>,
    since: Option<&str>,
    now: i64,
) -> (Option<i64>, Option<i64>) {
    match since.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_relative(raw) {
            Some(duration) => (Some(now.saturating_sub(duration)), Some(now)),
            None => {
                tracing::warn!(since = raw, "ignoring unparseable relative time");
                (start_time, end_time)
            }
        },
        None => (start_time, end_time),
    }
}
