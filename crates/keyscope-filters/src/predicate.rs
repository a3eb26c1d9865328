//! Backend-neutral predicate tree
//!
//! Leaves name logical fields; storage adapters decide how a field maps to a
//! column. `Any` with no children matches nothing and `All` with no children
//! matches everything.

use keyscope_core::{FilterOperator, ScalarValue};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Predicate {
    /// Field equals one of `values`
    InSet {
        field: String,
        values: Vec<ScalarValue>,
    },
    /// Single comparison; `Is` means equality, other operators are patterns
    Match {
        field: String,
        operator: FilterOperator,
        value: String,
    },
    Any {
        predicates: Vec<Predicate>,
    },
    All {
        predicates: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn in_set(field: impl Into<String>, values: Vec<ScalarValue>) -> Self {
        Predicate::InSet {
            field: field.into(),
            values,
        }
    }

    pub fn matching(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Predicate::Match {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Disjunction; a single child is returned as-is
    pub fn any(mut predicates: Vec<Predicate>) -> Self {
        if predicates.len() == 1 {
            return predicates.remove(0);
        }
        Predicate::Any { predicates }
    }

    /// Conjunction; a single child is returned as-is
    pub fn all(mut predicates: Vec<Predicate>) -> Self {
        if predicates.len() == 1 {
            return predicates.remove(0);
        }
        Predicate::All { predicates }
    }

    pub fn nothing() -> Self {
        Predicate::Any {
            predicates: Vec::new(),
        }
    }

    /// True for predicates that can never match, e.g. an empty key set
    pub fn is_unsatisfiable(&self) -> bool {
        match self {
            Predicate::InSet { values, .. } => values.is_empty(),
            Predicate::Match { .. } => false,
            Predicate::Any { predicates } => predicates.iter().all(Predicate::is_unsatisfiable),
            Predicate::All { predicates } => predicates.iter().any(Predicate::is_unsatisfiable),
        }
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::InSet { field, values } => match record.field(field) {
                Some(actual) => values.iter().any(|v| v.to_string() == actual),
                None => false,
            },
            Predicate::Match {
                field,
                operator,
                value,
            } => match record.field(field) {
                Some(actual) => match operator {
                    FilterOperator::Is => actual == *value,
                    FilterOperator::Contains => actual.contains(value.as_str()),
                    FilterOperator::StartsWith => actual.starts_with(value.as_str()),
                    FilterOperator::EndsWith => actual.ends_with(value.as_str()),
                },
                None => false,
            },
            Predicate::Any { predicates } => predicates.iter().any(|p| p.matches(record)),
            Predicate::All { predicates } => predicates.iter().all(|p| p.matches(record)),
        }
    }
}

/// SQL LIKE pattern for a pattern operator, with wildcards in `value` escaped
pub fn like_pattern(operator: FilterOperator, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    match operator {
        FilterOperator::Is => escaped,
        FilterOperator::Contains => format!("%{}%", escaped),
        FilterOperator::StartsWith => format!("{}%", escaped),
        FilterOperator::EndsWith => format!("%{}", escaped),
    }
}

/// Anything predicates can be evaluated against
pub trait Record {
    /// Text value stored under a logical field, if any
    fn field(&self, name: &str) -> Option<String>;
}

impl Record for BTreeMap<String, ScalarValue> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }
}

impl Record for HashMap<String, ScalarValue> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> BTreeMap<String, ScalarValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ScalarValue::text(*v)))
            .collect()
    }

    #[test]
    fn test_empty_combinators() {
        let row = record(&[("name", "x")]);
        assert!(!Predicate::nothing().matches(&row));
        assert!(Predicate::All { predicates: vec![] }.matches(&row));
        assert!(Predicate::nothing().is_unsatisfiable());
        assert!(Predicate::in_set("name", vec![]).is_unsatisfiable());
    }

    #[test]
    fn test_singleton_combinators_unwrap() {
        let leaf = Predicate::matching("name", FilterOperator::Is, "x");
        assert_eq!(Predicate::any(vec![leaf.clone()]), leaf);
        assert_eq!(Predicate::all(vec![leaf.clone()]), leaf);
    }

    #[test]
    fn test_pattern_matching() {
        let row = record(&[("path", "/v1/keys.verifyKey")]);
        let cases = [
            (FilterOperator::Is, "/v1/keys.verifyKey", true),
            (FilterOperator::Contains, "keys", true),
            (FilterOperator::StartsWith, "/v1", true),
            (FilterOperator::StartsWith, "/v2", false),
            (FilterOperator::EndsWith, "verifyKey", true),
        ];
        for (operator, value, expected) in cases {
            let p = Predicate::matching("path", operator, value);
            assert_eq!(p.matches(&row), expected, "{} {}", operator, value);
        }
    }

    #[test]
    fn test_in_set_compares_text_form() {
        let mut row = BTreeMap::new();
        row.insert("status".to_string(), ScalarValue::Integer(404));
        let p = Predicate::in_set("status", vec![ScalarValue::Integer(200), ScalarValue::Integer(404)]);
        assert!(p.matches(&row));
        assert!(!Predicate::in_set("missing", vec![ScalarValue::Integer(404)]).matches(&row));
    }

    #[test]
    fn test_like_pattern_positions_and_escaping() {
        assert_eq!(like_pattern(FilterOperator::Contains, "ab"), "%ab%");
        assert_eq!(like_pattern(FilterOperator::StartsWith, "ab"), "ab%");
        assert_eq!(like_pattern(FilterOperator::EndsWith, "ab"), "%ab");
        assert_eq!(like_pattern(FilterOperator::Contains, "50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let p = Predicate::any(vec![
            Predicate::in_set("keyIds", vec!["k1".into()]),
            Predicate::matching("names", FilterOperator::Contains, "prod"),
        ]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["kind"], "any");
        assert_eq!(json["predicates"][0]["kind"], "inSet");
        assert_eq!(json["predicates"][1]["operator"], "contains");
    }
}
