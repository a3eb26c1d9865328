mod common;

use common::NOW;
use keyscope_core::{
    resolve_at, Granularity, GranularityContext, DAY_MS, HOUR_MS, MINUTE_MS, REGULAR_LADDER,
    VERIFICATIONS_LADDER,
};
use keyscope_filters::Domain;

const CONTEXTS: [GranularityContext; 2] = [GranularityContext::Regular, GranularityContext::Verifications];

fn granularity_for(context: GranularityContext, range_ms: i64) -> Granularity {
    resolve_at(context, Some(NOW - range_ms), Some(NOW), NOW).granularity
}

#[test]
fn test_documented_examples() {
    assert_eq!(
        granularity_for(GranularityContext::Regular, 3 * HOUR_MS),
        Granularity::Per5Minutes
    );
    assert_eq!(
        granularity_for(GranularityContext::Verifications, 30 * DAY_MS),
        Granularity::PerWeek
    );
}

#[test]
fn test_ladders_are_independent() {
    // same range, different cutoffs per context
    assert_eq!(granularity_for(GranularityContext::Regular, DAY_MS), Granularity::Per2Hours);
    assert_eq!(granularity_for(GranularityContext::Verifications, DAY_MS), Granularity::PerHour);
    assert_eq!(granularity_for(GranularityContext::Regular, 90 * DAY_MS), Granularity::PerDay);
    assert_eq!(
        granularity_for(GranularityContext::Verifications, 90 * DAY_MS),
        Granularity::PerMonth
    );
}

#[test]
fn test_every_rung_is_reachable_exactly_at_its_threshold() {
    for (context, ladder) in [
        (GranularityContext::Regular, REGULAR_LADDER),
        (GranularityContext::Verifications, VERIFICATIONS_LADDER),
    ] {
        for rung in ladder {
            assert_eq!(granularity_for(context, rung.min_range_ms), rung.granularity);
            assert_eq!(granularity_for(context, rung.min_range_ms + 1), rung.granularity);
        }
    }
}

#[test]
fn test_coarseness_never_decreases_with_range() {
    for context in CONTEXTS {
        let mut previous = granularity_for(context, 0);
        let mut range = MINUTE_MS;
        while range < 400 * DAY_MS {
            let current = granularity_for(context, range);
            assert!(current >= previous, "{:?}: {} ms went finer", context, range);
            previous = current;
            range += 7 * MINUTE_MS;
        }
    }
}

#[test]
fn test_defaults_match_explicit_default_window() {
    for context in CONTEXTS {
        let defaulted = resolve_at(context, None, None, NOW);
        let explicit = granularity_for(context, context.default_duration_ms());
        assert_eq!(defaulted.granularity, explicit);
        assert_eq!(defaulted.end_time, NOW);
    }
}

#[test]
fn test_domains_pick_their_context() {
    for domain in Domain::ALL {
        let expected = if domain == Domain::Verifications {
            GranularityContext::Verifications
        } else {
            GranularityContext::Regular
        };
        assert_eq!(domain.granularity_context(), expected);
    }
}
