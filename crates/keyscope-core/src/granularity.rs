//! Bucket-size resolution for timeseries queries
//!
//! Each context owns its own threshold ladder. A ladder is scanned from the
//! coarsest rung to the finest and the first rung whose minimum range is met
//! wins; ranges below every rung get the context's finest bucket.

use crate::types::TimeWindow;
use serde::{Deserialize, Serialize};

pub const MINUTE_MS: i64 = 60 * 1000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;
pub const MONTH_MS: i64 = 30 * DAY_MS;
pub const QUARTER_MS: i64 = 90 * DAY_MS;
pub const YEAR_MS: i64 = 365 * DAY_MS;

/// Timeseries bucket size, ordered finest to coarsest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    PerMinute,
    Per5Minutes,
    Per15Minutes,
    Per30Minutes,
    PerHour,
    Per2Hours,
    Per4Hours,
    Per6Hours,
    Per12Hours,
    PerDay,
    Per3Days,
    PerWeek,
    PerMonth,
    PerQuarter,
}

impl Granularity {
    /// Nominal bucket length. Months count as 30 days, quarters as 90.
    pub fn duration_ms(&self) -> i64 {
        match self {
            Granularity::PerMinute => MINUTE_MS,
            Granularity::Per5Minutes => 5 * MINUTE_MS,
            Granularity::Per15Minutes => 15 * MINUTE_MS,
            Granularity::Per30Minutes => 30 * MINUTE_MS,
            Granularity::PerHour => HOUR_MS,
            Granularity::Per2Hours => 2 * HOUR_MS,
            Granularity::Per4Hours => 4 * HOUR_MS,
            Granularity::Per6Hours => 6 * HOUR_MS,
            Granularity::Per12Hours => 12 * HOUR_MS,
            Granularity::PerDay => DAY_MS,
            Granularity::Per3Days => 3 * DAY_MS,
            Granularity::PerWeek => WEEK_MS,
            Granularity::PerMonth => MONTH_MS,
            Granularity::PerQuarter => QUARTER_MS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::PerMinute => "perMinute",
            Granularity::Per5Minutes => "per5Minutes",
            Granularity::Per15Minutes => "per15Minutes",
            Granularity::Per30Minutes => "per30Minutes",
            Granularity::PerHour => "perHour",
            Granularity::Per2Hours => "per2Hours",
            Granularity::Per4Hours => "per4Hours",
            Granularity::Per6Hours => "per6Hours",
            Granularity::Per12Hours => "per12Hours",
            Granularity::PerDay => "perDay",
            Granularity::Per3Days => "per3Days",
            Granularity::PerWeek => "perWeek",
            Granularity::PerMonth => "perMonth",
            Granularity::PerQuarter => "perQuarter",
        }
    }

    /// Number of buckets needed to cover `window`; at least one
    pub fn bucket_count(&self, window: &TimeWindow) -> usize {
        let range = window.range_ms();
        if range <= 0 {
            return 1;
        }
        let duration = self.duration_ms();
        let buckets = range / duration + i64::from(range % duration != 0);
        usize::try_from(buckets).unwrap_or(usize::MAX).max(1)
    }
}

/// One rung of a ladder: ranges of at least `min_range_ms` use `granularity`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub min_range_ms: i64,
    pub granularity: Granularity,
}

const fn rung(min_range_ms: i64, granularity: Granularity) -> Threshold {
    Threshold {
        min_range_ms,
        granularity,
    }
}

/// Ladder for request/ratelimit/key activity charts, coarsest first
pub const REGULAR_LADDER: &[Threshold] = &[
    rung(14 * DAY_MS, Granularity::PerDay),
    rung(7 * DAY_MS, Granularity::Per12Hours),
    rung(3 * DAY_MS, Granularity::Per6Hours),
    rung(2 * DAY_MS, Granularity::Per4Hours),
    rung(DAY_MS, Granularity::Per2Hours),
    rung(16 * HOUR_MS, Granularity::PerHour),
    rung(8 * HOUR_MS, Granularity::Per30Minutes),
    rung(4 * HOUR_MS, Granularity::Per15Minutes),
    rung(2 * HOUR_MS, Granularity::Per5Minutes),
];

/// Ladder for key verification charts, coarsest first
pub const VERIFICATIONS_LADDER: &[Threshold] = &[
    rung(YEAR_MS, Granularity::PerQuarter),
    rung(QUARTER_MS, Granularity::PerMonth),
    rung(MONTH_MS, Granularity::PerWeek),
    rung(14 * DAY_MS, Granularity::Per3Days),
    rung(WEEK_MS, Granularity::PerDay),
    rung(4 * DAY_MS, Granularity::Per12Hours),
    rung(3 * DAY_MS, Granularity::Per6Hours),
    rung(2 * DAY_MS, Granularity::Per4Hours),
    rung(36 * HOUR_MS, Granularity::Per2Hours),
];

/// Selects the ladder and defaults used for a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GranularityContext {
    #[serde(rename = "forRegular")]
    Regular,
    #[serde(rename = "forVerifications")]
    Verifications,
}

impl GranularityContext {
    /// Window length used when the caller gives no bounds
    pub fn default_duration_ms(&self) -> i64 {
        match self {
            GranularityContext::Regular => HOUR_MS,
            GranularityContext::Verifications => DAY_MS,
        }
    }

    pub fn default_granularity(&self) -> Granularity {
        match self {
            GranularityContext::Regular => Granularity::PerMinute,
            GranularityContext::Verifications => Granularity::PerHour,
        }
    }

    pub fn ladder(&self) -> &'static [Threshold] {
        match self {
            GranularityContext::Regular => REGULAR_LADDER,
            GranularityContext::Verifications => VERIFICATIONS_LADDER,
        }
    }

    pub fn finest(&self) -> Granularity {
        match self {
            GranularityContext::Regular => Granularity::PerMinute,
            GranularityContext::Verifications => Granularity::PerHour,
        }
    }

    /// First rung met scanning coarsest to finest, else the finest bucket
    pub fn granularity_for_range(&self, range_ms: i64) -> Granularity {
        self.ladder()
            .iter()
            .find(|t| range_ms >= t.min_range_ms)
            .map(|t| t.granularity)
            .unwrap_or_else(|| self.finest())
    }
}

/// Bucket size plus the normalized window it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GranularityResult {
    pub granularity: Granularity,
    pub start_time: i64,
    pub end_time: i64,
    pub context: GranularityContext,
}

impl GranularityResult {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

/// Resolve granularity and window relative to the current wall clock
pub fn resolve(
    context: GranularityContext,
    start_time: Option<i64>,
    end_time: Option<i64>,
) -> GranularityResult {
    resolve_at(
        context,
        start_time,
        end_time,
        chrono::Utc::now().timestamp_millis(),
    )
}

/// Resolve granularity and window relative to `now`. Total: every input,
/// including inverted or enormous ranges, has a defined result.
pub fn resolve_at(
    context: GranularityContext,
    start_time: Option<i64>,
    end_time: Option<i64>,
    now: i64,
) -> GranularityResult {
    let default_duration = context.default_duration_ms();

    if start_time.is_none() && end_time.is_none() {
        return GranularityResult {
            granularity: context.default_granularity(),
            start_time: now.saturating_sub(default_duration),
            end_time: now,
            context,
        };
    }

    let end_time = end_time.unwrap_or(now);
    let start_time = start_time.unwrap_or_else(|| end_time.saturating_sub(default_duration));
    let range = end_time.saturating_sub(start_time);
    let granularity = context.granularity_for_range(range);

    tracing::debug!(
        ?context,
        range_ms = range,
        granularity = granularity.as_str(),
        "resolved timeseries granularity"
    );

    GranularityResult {
        granularity,
        start_time,
        end_time,
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;
    const CONTEXTS: [GranularityContext; 2] =
        [GranularityContext::Regular, GranularityContext::Verifications];

    fn for_range(context: GranularityContext, range: i64) -> Granularity {
        resolve_at(context, Some(NOW - range), Some(NOW), NOW).granularity
    }

    #[test]
    fn test_defaults_when_no_bounds() {
        let regular = resolve_at(GranularityContext::Regular, None, None, NOW);
        assert_eq!(regular.granularity, Granularity::PerMinute);
        assert_eq!(regular.start_time, NOW - HOUR_MS);
        assert_eq!(regular.end_time, NOW);

        let verifications = resolve_at(GranularityContext::Verifications, None, None, NOW);
        assert_eq!(verifications.granularity, Granularity::PerHour);
        assert_eq!(verifications.start_time, NOW - DAY_MS);
        assert_eq!(verifications.end_time, NOW);
    }

    #[test]
    fn test_default_fill_is_idempotent() {
        for context in CONTEXTS {
            let defaulted = resolve_at(context, None, None, NOW);
            let explicit = resolve_at(
                context,
                Some(NOW - context.default_duration_ms()),
                Some(NOW),
                NOW,
            );
            assert_eq!(defaulted.granularity, explicit.granularity, "{:?}", context);
            assert_eq!(defaulted.window(), explicit.window());
        }
    }

    #[test]
    fn test_missing_end_uses_now() {
        let result = resolve_at(
            GranularityContext::Regular,
            Some(NOW - 3 * HOUR_MS),
            None,
            NOW,
        );
        assert_eq!(result.end_time, NOW);
        assert_eq!(result.granularity, Granularity::Per5Minutes);
    }

    #[test]
    fn test_missing_start_uses_default_duration() {
        let end = NOW - 10 * DAY_MS;
        let result = resolve_at(GranularityContext::Verifications, None, Some(end), NOW);
        assert_eq!(result.start_time, end - DAY_MS);
        assert_eq!(result.end_time, end);
        assert_eq!(result.granularity, Granularity::PerHour);
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(
            for_range(GranularityContext::Regular, 3 * HOUR_MS),
            Granularity::Per5Minutes
        );
        assert_eq!(
            for_range(GranularityContext::Verifications, 30 * DAY_MS),
            Granularity::PerWeek
        );
    }

    #[test]
    fn test_regular_ladder_boundaries() {
        let expected = [
            (14 * DAY_MS, Granularity::PerDay),
            (7 * DAY_MS, Granularity::Per12Hours),
            (3 * DAY_MS, Granularity::Per6Hours),
            (2 * DAY_MS, Granularity::Per4Hours),
            (DAY_MS, Granularity::Per2Hours),
            (16 * HOUR_MS, Granularity::PerHour),
            (8 * HOUR_MS, Granularity::Per30Minutes),
            (4 * HOUR_MS, Granularity::Per15Minutes),
            (2 * HOUR_MS, Granularity::Per5Minutes),
        ];
        for (threshold, granularity) in expected {
            let context = GranularityContext::Regular;
            assert_eq!(for_range(context, threshold), granularity);
            assert_eq!(for_range(context, threshold + 1), granularity);
            assert!(for_range(context, threshold - 1) < granularity);
        }
    }

    #[test]
    fn test_verifications_ladder_boundaries() {
        let expected = [
            (YEAR_MS, Granularity::PerQuarter),
            (QUARTER_MS, Granularity::PerMonth),
            (MONTH_MS, Granularity::PerWeek),
            (14 * DAY_MS, Granularity::Per3Days),
            (WEEK_MS, Granularity::PerDay),
            (4 * DAY_MS, Granularity::Per12Hours),
            (3 * DAY_MS, Granularity::Per6Hours),
            (2 * DAY_MS, Granularity::Per4Hours),
            (36 * HOUR_MS, Granularity::Per2Hours),
        ];
        for (threshold, granularity) in expected {
            let context = GranularityContext::Verifications;
            assert_eq!(for_range(context, threshold), granularity);
            assert_eq!(for_range(context, threshold + 1), granularity);
            assert!(for_range(context, threshold - 1) < granularity);
        }
    }

    #[test]
    fn test_ladders_are_strictly_ordered() {
        for context in CONTEXTS {
            for pair in context.ladder().windows(2) {
                assert!(pair[0].min_range_ms > pair[1].min_range_ms);
                assert!(pair[0].granularity > pair[1].granularity);
            }
            let last = context.ladder().last().unwrap();
            assert!(last.granularity > context.finest());
        }
    }

    #[test]
    fn test_monotonic_in_range() {
        for context in CONTEXTS {
            let mut previous = context.finest();
            let mut range = 0;
            while range <= 2 * YEAR_MS {
                let current = for_range(context, range);
                assert!(current >= previous, "{:?} got finer at {}", context, range);
                previous = current;
                range += 30 * MINUTE_MS;
            }
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        for context in CONTEXTS {
            assert_eq!(for_range(context, 0), context.finest());
            assert_eq!(for_range(context, -DAY_MS), context.finest());
            assert_eq!(
                for_range(context, i64::MAX),
                context.ladder()[0].granularity
            );
        }
        let extreme = resolve_at(GranularityContext::Regular, Some(i64::MIN), None, NOW);
        assert_eq!(extreme.granularity, Granularity::PerDay);
    }

    #[test]
    fn test_granularity_serializes_camel_case() {
        let json = serde_json::to_string(&Granularity::Per5Minutes).unwrap();
        assert_eq!(json, "\"per5Minutes\"");
        let json = serde_json::to_string(&GranularityContext::Verifications).unwrap();
        assert_eq!(json, "\"forVerifications\"");
        for g in [Granularity::PerQuarter, Granularity::Per12Hours] {
            let json = serde_json::to_string(&g).unwrap();
            assert_eq!(json, format!("\"{}\"", g.as_str()));
        }
    }

    #[test]
    fn test_bucket_count() {
        let window = TimeWindow::new(0, 3 * HOUR_MS);
        assert_eq!(Granularity::Per5Minutes.bucket_count(&window), 36);
        assert_eq!(Granularity::PerHour.bucket_count(&TimeWindow::new(0, 90 * MINUTE_MS)), 2);
        assert_eq!(Granularity::PerDay.bucket_count(&TimeWindow::new(5, 5)), 1);
        assert_eq!(Granularity::PerDay.bucket_count(&TimeWindow::new(5, 0)), 1);
    }
}
