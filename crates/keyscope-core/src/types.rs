//! Request-scoped filter and time types

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Inclusive time window in unix milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_time: i64,
    pub end_time: i64,
}

impl TimeWindow {
    pub fn new(start_time: i64, end_time: i64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Window length; negative when the bounds are inverted
    pub fn range_ms(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time)
    }
}

/// Comparison applied by a single filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Exact match
    Is,
    /// Substring match (`%v%`)
    Contains,
    /// Prefix match (`v%`)
    StartsWith,
    /// Suffix match (`%v`)
    EndsWith,
}

impl FilterOperator {
    /// Parse an operator name. Names outside the closed set are treated as
    /// `Is` so that newer UI operators degrade to exact matching.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "is" => FilterOperator::Is,
            "contains" => FilterOperator::Contains,
            "startsWith" => FilterOperator::StartsWith,
            "endsWith" => FilterOperator::EndsWith,
            other => {
                tracing::warn!(operator = other, "unknown filter operator, using exact match");
                FilterOperator::Is
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Is => "is",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
        }
    }

    pub fn is_pattern(&self) -> bool {
        !matches!(self, FilterOperator::Is)
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter operand: either a string or an integer, nothing else
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Integer(i64),
    Text(String),
}

impl ScalarValue {
    pub fn text(value: impl Into<String>) -> Self {
        ScalarValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            ScalarValue::Integer(_) => None,
        }
    }

    /// Integer view; numeric strings are accepted
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ScalarValue::Integer(n) => Some(*n),
            ScalarValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Integer(n) => write!(f, "{}", n),
            ScalarValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Integer(value)
    }
}

/// Operator/value pair as sent by the UI, before it is attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub operator: FilterOperator,
    pub value: ScalarValue,
}

/// A single field filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub field: String,
    pub operator: FilterOperator,
    pub value: ScalarValue,
}

impl FilterValue {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<ScalarValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn is(field: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::new(field, FilterOperator::Is, value)
    }
}

/// Filter values grouped by field name. Values within a group are OR-ed,
/// groups are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGroups {
    groups: BTreeMap<String, Vec<FilterValue>>,
}

impl FilterGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: FilterValue) {
        self.groups
            .entry(value.field.clone())
            .or_default()
            .push(value);
    }

    /// Attach raw UI conditions to `field`
    pub fn extend_conditions(
        &mut self,
        field: &str,
        conditions: impl IntoIterator<Item = FilterCondition>,
    ) {
        for condition in conditions {
            self.push(FilterValue::new(field, condition.operator, condition.value));
        }
    }

    pub fn get(&self, field: &str) -> &[FilterValue] {
        self.groups.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_field(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[FilterValue])> {
        self.groups
            .iter()
            .map(|(field, values)| (field.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}

impl FromIterator<FilterValue> for FilterGroups {
    fn from_iter<I: IntoIterator<Item = FilterValue>>(iter: I) -> Self {
        let mut groups = FilterGroups::new();
        for value in iter {
            groups.push(value);
        }
        groups
    }
}
