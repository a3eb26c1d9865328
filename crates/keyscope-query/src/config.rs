//! Pipeline configuration

use keyscope_filters::fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Logical field -> physical column for key resolver predicates
    pub resolver_columns: BTreeMap<String, String>,

    /// Return an empty result without calling the executor when the key
    /// filter can never match
    pub short_circuit_empty_scope: bool,
}

impl QueryConfig {
    pub fn new() -> Self {
        let mut resolver_columns = BTreeMap::new();
        resolver_columns.insert(fields::KEY_IDS.to_string(), "k.id".to_string());
        resolver_columns.insert(fields::NAMES.to_string(), "k.name".to_string());
        resolver_columns.insert(
            fields::IDENTITY_EXTERNAL_ID.to_string(),
            "i.external_id".to_string(),
        );
        resolver_columns.insert(fields::OWNER_ID.to_string(), "k.owner_id".to_string());

        Self {
            resolver_columns,
            short_circuit_empty_scope: true,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Physical resolver column; unmapped fields are used verbatim
    pub fn resolver_column<'a>(&'a self, field: &'a str) -> &'a str {
        self.resolver_columns
            .get(field)
            .map(String::as_str)
            .unwrap_or(field)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new()
    }
}
