//! Filter compilation: UI filter groups to typed, deduplicated predicates

use crate::predicate::Predicate;
use crate::schema::{Domain, FieldSpec, PayloadShape, Route, ValueKind};
use keyscope_core::{FilterCondition, FilterGroups, FilterOperator, FilterValue, ScalarValue};
use serde::Serialize;
use std::collections::HashSet;

/// Executor payload for one field, in the shape its schema entry declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldPayload {
    Values(Vec<ScalarValue>),
    Conditions(Vec<FilterCondition>),
}

/// Predicates for a single field; they are alternatives (OR)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledField {
    pub spec: &'static FieldSpec,
    pub predicates: Vec<Predicate>,
}

impl CompiledField {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// The field's disjunction. With no predicates this matches nothing.
    pub fn predicate(&self) -> Predicate {
        Predicate::any(self.predicates.clone())
    }

    pub fn payload(&self) -> FieldPayload {
        match self.spec.shape {
            PayloadShape::Values => FieldPayload::Values(
                self.predicates
                    .iter()
                    .flat_map(|p| match p {
                        Predicate::InSet { values, .. } => values.clone(),
                        _ => Vec::new(),
                    })
                    .collect(),
            ),
            PayloadShape::Conditions => {
                let mut conditions = Vec::new();
                for p in &self.predicates {
                    match p {
                        Predicate::InSet { values, .. } => {
                            conditions.extend(values.iter().map(|v| FilterCondition {
                                operator: FilterOperator::Is,
                                value: v.clone(),
                            }))
                        }
                        Predicate::Match {
                            operator, value, ..
                        } => conditions.push(FilterCondition {
                            operator: *operator,
                            value: ScalarValue::text(value.as_str()),
                        }),
                        Predicate::Any { .. } | Predicate::All { .. } => {}
                    }
                }
                FieldPayload::Conditions(conditions)
            }
        }
    }
}

/// Compiled fields of one domain; fields are combined with AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilterSet {
    pub domain: Domain,
    fields: Vec<CompiledField>,
}

impl CompiledFilterSet {
    pub fn empty(domain: Domain) -> Self {
        Self {
            domain,
            fields: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn executor_fields(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.iter().filter(|f| f.spec.route.to_executor())
    }

    pub fn resolver_fields(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.iter().filter(|f| f.spec.route.to_resolver())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Conjunction of every field, or `None` when nothing was filtered
    pub fn predicate(&self) -> Option<Predicate> {
        if self.fields.is_empty() {
            return None;
        }
        Some(Predicate::all(
            self.fields.iter().map(CompiledField::predicate).collect(),
        ))
    }
}

/// Compile UI filter groups for `domain`.
///
/// Fields unknown to the domain are skipped, as are identity filters, which
/// the key scope builder expands separately. Never fails.
pub fn compile(domain: Domain, groups: &FilterGroups) -> CompiledFilterSet {
    let mut compiled = CompiledFilterSet::empty(domain);

    for (name, values) in groups.fields() {
        let Some(spec) = domain.field(name) else {
            tracing::debug!(%domain, field = name, "ignoring filter on unknown field");
            continue;
        };
        if spec.route == Route::KeyScope {
            continue;
        }
        if let Some(field) = compile_field(spec, values) {
            compiled.fields.push(field);
        }
    }

    compiled
}

/// Compile one field's values. Returns `None` when no usable value remains,
/// so the field drops out of the conjunction instead of matching nothing.
pub fn compile_field(spec: &'static FieldSpec, values: &[FilterValue]) -> Option<CompiledField> {
    let mut exact: Vec<ScalarValue> = Vec::new();
    let mut patterns: Vec<(FilterOperator, String)> = Vec::new();
    let mut seen_exact: HashSet<ScalarValue> = HashSet::new();
    let mut seen_patterns: HashSet<(FilterOperator, String)> = HashSet::new();

    for filter in values {
        let operator = if spec.supports(filter.operator) {
            filter.operator
        } else {
            tracing::warn!(
                field = spec.name,
                operator = filter.operator.as_str(),
                "operator not supported for field, using exact match"
            );
            FilterOperator::Is
        };

        let Some(value) = normalize(spec, &filter.value) else {
            tracing::warn!(field = spec.name, value = %filter.value, "dropping filter value of wrong kind");
            continue;
        };

        if operator.is_pattern() {
            let entry = (operator, value.to_string());
            if seen_patterns.insert(entry.clone()) {
                patterns.push(entry);
            }
        } else if seen_exact.insert(value.clone()) {
            exact.push(value);
        }
    }

    let mut predicates = Vec::with_capacity(patterns.len() + 1);
    if !exact.is_empty() {
        predicates.push(Predicate::in_set(spec.name, exact));
    }
    predicates.extend(
        patterns
            .into_iter()
            .map(|(operator, value)| Predicate::matching(spec.name, operator, value)),
    );

    if predicates.is_empty() {
        return None;
    }
    Some(CompiledField { spec, predicates })
}

fn normalize(spec: &FieldSpec, value: &ScalarValue) -> Option<ScalarValue> {
    match spec.kind {
        ValueKind::Integer => value.as_integer().map(ScalarValue::Integer),
        ValueKind::Text => Some(ScalarValue::Text(value.to_string())),
        ValueKind::PassFlag => {
            let label = value.as_text()?.trim().to_ascii_lowercase();
            matches!(label.as_str(), "passed" | "blocked").then(|| ScalarValue::Text(label))
        }
    }
}
