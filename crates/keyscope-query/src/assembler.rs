//! Final request assembly for the aggregation executor

use crate::resolver::ResolvedKeys;
use keyscope_core::{FilterValue, Granularity, GranularityResult, TimeWindow};
use keyscope_filters::{
    compile_field, fields, CompiledField, CompiledFilterSet, Domain, FieldPayload, FieldSpec,
    Predicate,
};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Payload key carrying the resolver's answer next to an explicit key filter
pub const RESOLVED_KEY_IDS: &str = "resolvedKeyIds";

/// Key bound applied to the executor query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// Domain is not key-scoped
    Unscoped,
    /// Key filter given by the caller, passed through untouched. `bound` is
    /// the resolver's answer for the same scope and is ANDed with it.
    Explicit {
        filter: CompiledField,
        bound: Option<CompiledField>,
    },
    /// Exact match on every key the resolver returned; empty matches nothing
    Resolved(CompiledField),
}

impl KeyFilter {
    /// The key field as it travels under `keyIds`
    pub fn field(&self) -> Option<&CompiledField> {
        match self {
            KeyFilter::Unscoped => None,
            KeyFilter::Explicit { filter, .. } => Some(filter),
            KeyFilter::Resolved(field) => Some(field),
        }
    }

    pub fn predicate(&self) -> Option<Predicate> {
        match self {
            KeyFilter::Unscoped => None,
            KeyFilter::Explicit {
                filter,
                bound: Some(bound),
            } => Some(Predicate::all(vec![filter.predicate(), bound.predicate()])),
            KeyFilter::Explicit { filter, bound: None } => Some(filter.predicate()),
            KeyFilter::Resolved(field) => Some(field.predicate()),
        }
    }
}

/// Everything the executor needs for one bucketed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorRequest {
    pub domain: Domain,
    pub granularity: Granularity,
    pub start_time: i64,
    pub end_time: i64,
    pub key_filter: KeyFilter,
    /// Executor-routed fields other than the key filter
    pub fields: Vec<CompiledField>,
}

impl ExecutorRequest {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    /// Conjunction of the key filter and every field, `None` if unfiltered
    pub fn predicate(&self) -> Option<Predicate> {
        let mut parts: Vec<Predicate> = self.key_filter.predicate().into_iter().collect();
        parts.extend(self.fields.iter().map(CompiledField::predicate));
        if parts.is_empty() {
            return None;
        }
        Some(Predicate::all(parts))
    }

    /// True when the key filter rules out every row
    pub fn matches_nothing(&self) -> bool {
        self.key_filter
            .predicate()
            .is_some_and(|p| p.is_unsatisfiable())
    }

    pub fn bucket_count(&self) -> usize {
        self.granularity.bucket_count(&self.window())
    }

    fn payloads(&self) -> Vec<(&'static str, FieldPayload)> {
        let mut payloads = Vec::with_capacity(self.fields.len() + 2);
        if let Some(field) = self.key_filter.field() {
            payloads.push((field.spec.payload_key, field.payload()));
        }
        if let KeyFilter::Explicit {
            bound: Some(bound), ..
        } = &self.key_filter
        {
            payloads.push((RESOLVED_KEY_IDS, bound.payload()));
        }
        payloads.extend(self.fields.iter().map(|f| (f.spec.payload_key, f.payload())));
        payloads
    }
}

impl Serialize for ExecutorRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("startTime", &self.start_time)?;
        map.serialize_entry("endTime", &self.end_time)?;
        map.serialize_entry("granularity", &self.granularity)?;
        for (key, payload) in self.payloads() {
            map.serialize_entry(key, &payload)?;
        }
        map.end()
    }
}

/// Merge resolved keys, compiled filters and the resolved window into an
/// executor request.
///
/// A resolver answer is turned into one exact-match filter value per key ID;
/// an empty answer matches nothing. An explicit key filter is kept as given
/// and the resolver answer bounds it, so name and identity narrowing and the
/// keyspace still apply.
pub fn assemble(
    resolved: Option<&ResolvedKeys>,
    explicit_key_filter: Option<&CompiledField>,
    compiled: &CompiledFilterSet,
    granularity: GranularityResult,
) -> ExecutorRequest {
    let domain = compiled.domain;

    let bound = resolved
        .zip(domain.field(fields::KEY_IDS))
        .map(|(resolved, spec)| resolved_key_field(spec, resolved));

    let key_filter = match (explicit_key_filter, bound) {
        (Some(explicit), bound) => KeyFilter::Explicit {
            filter: explicit.clone(),
            bound,
        },
        (None, Some(bound)) => KeyFilter::Resolved(bound),
        (None, None) => KeyFilter::Unscoped,
    };

    let fields = compiled
        .executor_fields()
        .filter(|f| f.name() != fields::KEY_IDS)
        .cloned()
        .collect();

    ExecutorRequest {
        domain,
        granularity: granularity.granularity,
        start_time: granularity.start_time,
        end_time: granularity.end_time,
        key_filter,
        fields,
    }
}

fn resolved_key_field(spec: &'static FieldSpec, resolved: &ResolvedKeys) -> CompiledField {
    let synthesized: Vec<FilterValue> = resolved
        .keys
        .iter()
        .map(|key| FilterValue::is(fields::KEY_IDS, key.id.as_str()))
        .collect();
    compile_field(spec, &synthesized).unwrap_or(CompiledField {
        spec,
        predicates: Vec::new(),
    })
}
