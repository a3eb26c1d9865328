//! Identity scoping for key lookups
//!
//! A key belongs to an identity either through the identity relation or
//! through the legacy owner ID stored on the key itself, so every identity
//! filter value checks both columns.

use crate::compiler::CompiledFilterSet;
use crate::predicate::Predicate;
use crate::schema::fields;
use keyscope_core::FilterValue;
use std::collections::HashSet;

/// OR over all identity filter values, each matching either the identity's
/// external ID or the key's owner ID. `None` when no usable value is given.
pub fn build_key_scope(identity_filters: &[FilterValue]) -> Option<Predicate> {
    let mut seen = HashSet::new();
    let mut alternatives = Vec::new();

    for filter in identity_filters {
        let Some(value) = filter.value.as_text() else {
            tracing::debug!(value = %filter.value, "skipping non-string identity filter");
            continue;
        };
        if !seen.insert((filter.operator, value)) {
            continue;
        }

        alternatives.push(Predicate::Any {
            predicates: vec![
                Predicate::matching(fields::IDENTITY_EXTERNAL_ID, filter.operator, value),
                Predicate::matching(fields::OWNER_ID, filter.operator, value),
            ],
        });
    }

    if alternatives.is_empty() {
        return None;
    }
    Some(Predicate::any(alternatives))
}

/// Predicate for the key resolver: resolver-routed fields AND the identity
/// scope. `None` when neither contributes anything.
pub fn build_resolver_predicate(
    compiled: &CompiledFilterSet,
    identity_filters: &[FilterValue],
) -> Option<Predicate> {
    let mut parts: Vec<Predicate> = compiled
        .resolver_fields()
        .map(|field| field.predicate())
        .collect();
    parts.extend(build_key_scope(identity_filters));

    if parts.is_empty() {
        return None;
    }
    Some(Predicate::all(parts))
}
