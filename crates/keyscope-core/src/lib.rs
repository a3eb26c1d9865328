//! Time-window and filter primitives for analytics queries

mod granularity;
mod since;
mod types;

pub use granularity::{
    resolve, resolve_at, Granularity, GranularityContext, GranularityResult, Threshold, DAY_MS,
    HOUR_MS, MINUTE_MS, MONTH_MS, QUARTER_MS, REGULAR_LADDER, VERIFICATIONS_LADDER, WEEK_MS,
    YEAR_MS,
};
pub use since::{absolute_bounds, parse_relative};
pub use types::{FilterCondition, FilterGroups, FilterOperator, FilterValue, ScalarValue, TimeWindow};
