//! Per-domain field tables
//!
//! Every filterable field is declared once here: how the UI names it, where
//! its compiled predicates go, and what shape the executor expects it in.

use keyscope_core::{FilterOperator, GranularityContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical field names shared by the compiler, the key builder and renderers
pub mod fields {
    pub const KEY_IDS: &str = "keyIds";
    pub const NAMES: &str = "names";
    pub const IDENTITIES: &str = "identities";
    pub const OUTCOMES: &str = "outcomes";
    pub const STATUS: &str = "status";
    pub const METHODS: &str = "methods";
    pub const PATHS: &str = "paths";
    pub const HOST: &str = "host";
    pub const REQUEST_ID: &str = "requestId";
    pub const REQUEST_IDS: &str = "requestIds";
    pub const IDENTIFIERS: &str = "identifiers";

    /// External ID on the identity relation
    pub const IDENTITY_EXTERNAL_ID: &str = "identities.externalId";
    /// Legacy owner ID stored directly on the key
    pub const OWNER_ID: &str = "identities.ownerId";
}

/// Analytics surface a query belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Keys,
    Logs,
    Ratelimits,
    Verifications,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Keys,
        Domain::Logs,
        Domain::Ratelimits,
        Domain::Verifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Keys => "keys",
            Domain::Logs => "logs",
            Domain::Ratelimits => "ratelimits",
            Domain::Verifications => "verifications",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Domain::Keys | Domain::Verifications => KEY_FIELDS,
            Domain::Logs => LOG_FIELDS,
            Domain::Ratelimits => RATELIMIT_FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }

    pub fn granularity_context(&self) -> GranularityContext {
        match self {
            Domain::Verifications => GranularityContext::Verifications,
            Domain::Keys | Domain::Logs | Domain::Ratelimits => GranularityContext::Regular,
        }
    }

    /// Key-scoped domains must be bounded to the keys of one keyspace
    pub fn is_key_scoped(&self) -> bool {
        matches!(self, Domain::Keys | Domain::Verifications)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown analytics domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// How a field travels in the executor payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadShape {
    /// Batched exact values: `["GET", "POST"]`
    Values,
    /// Operator pairs: `[{"operator": "startsWith", "value": "/v1"}]`
    Conditions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Integer,
    /// `passed` or `blocked`, stored as a boolean pass flag
    PassFlag,
}

/// Which collaborator consumes a field's predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    Executor,
    Resolver,
    Both,
    /// Identity filters, expanded by the key scope builder
    KeyScope,
}

impl Route {
    pub fn to_executor(&self) -> bool {
        matches!(self, Route::Executor | Route::Both)
    }

    pub fn to_resolver(&self) -> bool {
        matches!(self, Route::Resolver | Route::Both)
    }
}

/// Static description of one filterable field
#[derive(Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name used by the UI filter state
    pub name: &'static str,
    /// Key in the executor payload
    pub payload_key: &'static str,
    /// Physical executor column
    pub column: &'static str,
    pub shape: PayloadShape,
    pub kind: ValueKind,
    /// Whether contains/startsWith/endsWith are honoured
    pub patterns: bool,
    pub route: Route,
}

impl FieldSpec {
    pub fn supports(&self, operator: FilterOperator) -> bool {
        !operator.is_pattern() || self.patterns
    }
}

const fn field(
    name: &'static str,
    payload_key: &'static str,
    column: &'static str,
    shape: PayloadShape,
    kind: ValueKind,
    patterns: bool,
    route: Route,
) -> FieldSpec {
    FieldSpec {
        name,
        payload_key,
        column,
        shape,
        kind,
        patterns,
        route,
    }
}

use PayloadShape::{Conditions, Values};
use ValueKind::{Integer, PassFlag, Text};

/// Ratelimit outcome label derived from the boolean `passed` column
const RATELIMIT_STATUS_COLUMN: &str = "if(passed, 'passed', 'blocked')";

static LOG_FIELDS: &[FieldSpec] = &[
    field(fields::STATUS, "statusCodes", "response_status", Values, Integer, false, Route::Executor),
    field(fields::METHODS, "methods", "method", Values, Text, false, Route::Executor),
    field(fields::PATHS, "paths", "path", Conditions, Text, true, Route::Executor),
    field(fields::HOST, "hosts", "host", Values, Text, false, Route::Executor),
    field(fields::REQUEST_ID, "requestIds", "request_id", Values, Text, false, Route::Executor),
];

static RATELIMIT_FIELDS: &[FieldSpec] = &[
    field(fields::IDENTIFIERS, "identifiers", "identifier", Conditions, Text, true, Route::Executor),
    field(fields::STATUS, "status", RATELIMIT_STATUS_COLUMN, Values, PassFlag, false, Route::Executor),
    field(fields::REQUEST_IDS, "requestIds", "request_id", Values, Text, false, Route::Executor),
];

static KEY_FIELDS: &[FieldSpec] = &[
    field(fields::KEY_IDS, "keyIds", "key_id", Conditions, Text, true, Route::Both),
    field(fields::NAMES, "names", "name", Conditions, Text, true, Route::Resolver),
    field(fields::IDENTITIES, "identities", "identity_id", Conditions, Text, true, Route::KeyScope),
    field(fields::OUTCOMES, "outcomes", "outcome", Values, Text, false, Route::Executor),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_round_trips_through_str() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>(), Ok(domain));
        }
        assert!("audit".parse::<Domain>().is_err());
    }

    #[test]
    fn test_domain_contexts() {
        assert_eq!(
            Domain::Verifications.granularity_context(),
            GranularityContext::Verifications
        );
        assert_eq!(Domain::Logs.granularity_context(), GranularityContext::Regular);
        assert!(Domain::Keys.is_key_scoped());
        assert!(!Domain::Ratelimits.is_key_scoped());
    }

    #[test]
    fn test_field_names_unique_per_domain() {
        for domain in Domain::ALL {
            let names: Vec<_> = domain.fields().iter().map(|f| f.name).collect();
            let mut deduped = names.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(names.len(), deduped.len(), "{}", domain);
        }
    }

    #[test]
    fn test_pattern_support() {
        let methods = Domain::Logs.field(fields::METHODS).unwrap();
        assert!(methods.supports(FilterOperator::Is));
        assert!(!methods.supports(FilterOperator::Contains));

        let paths = Domain::Logs.field(fields::PATHS).unwrap();
        assert!(paths.supports(FilterOperator::EndsWith));
    }
}
