//! Inbound query payload

use crate::error::QueryError;
use keyscope_core::{
    absolute_bounds, resolve_at, FilterCondition, FilterGroups, GranularityContext,
    GranularityResult,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Query as sent by the dashboard: time bounds plus filter groups keyed by
/// field name. Null groups count as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInput {
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub keyspace_id: Option<String>,
    #[serde(flatten)]
    pub filters: BTreeMap<String, Option<Vec<FilterCondition>>>,
}

impl QueryInput {
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn filter_groups(&self) -> FilterGroups {
        let mut groups = FilterGroups::new();
        for (field, conditions) in &self.filters {
            if let Some(conditions) = conditions {
                groups.extend_conditions(field, conditions.iter().cloned());
            }
        }
        groups
    }

    /// Apply `since`, then resolve granularity and window for `context`
    pub fn resolve_window(&self, context: GranularityContext, now: i64) -> GranularityResult {
        let (start_time, end_time) =
            absolute_bounds(self.start_time, self.end_time, self.since.as_deref(), now);
        resolve_at(context, start_time, end_time, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyscope_core::{FilterOperator, Granularity, HOUR_MS};

    const NOW: i64 = 1_760_000_000_000;

    #[test]
    fn test_parse_full_payload() {
        let input = QueryInput::from_json(
            r#"{
                "startTime": 1000,
                "endTime": 2000,
                "keyspaceId": "ks_1",
                "names": [{"operator": "contains", "value": "prod"}],
                "outcomes": null,
                "identities": [{"operator": "is", "value": "cus_1"}]
            }"#,
        )
        .unwrap();

        assert_eq!(input.start_time, Some(1000));
        assert_eq!(input.keyspace_id.as_deref(), Some("ks_1"));

        let groups = input.filter_groups();
        assert_eq!(groups.get("names")[0].operator, FilterOperator::Contains);
        assert!(groups.get("outcomes").is_empty());
        assert_eq!(groups.get("identities").len(), 1);
    }

    #[test]
    fn test_reject_malformed_values() {
        let err = QueryInput::from_json(r#"{"names": [{"operator": "is", "value": false}]}"#)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));

        let err = QueryInput::from_json(r#"{"names": "prod"}"#).unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput(_)));
    }

    #[test]
    fn test_since_resolves_before_granularity() {
        let input = QueryInput {
            since: Some("3h".to_string()),
            ..Default::default()
        };
        let result = input.resolve_window(GranularityContext::Regular, NOW);
        assert_eq!(result.start_time, NOW - 3 * HOUR_MS);
        assert_eq!(result.end_time, NOW);
        assert_eq!(result.granularity, Granularity::Per5Minutes);
    }

    #[test]
    fn test_empty_input_uses_context_defaults() {
        let input = QueryInput::from_json("{}").unwrap();
        let result = input.resolve_window(GranularityContext::Verifications, NOW);
        assert_eq!(result.granularity, Granularity::PerHour);
        assert!(input.filter_groups().is_empty());
    }
}
