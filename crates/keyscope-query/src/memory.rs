//! In-memory key resolver over keyspaces loaded from JSON

use crate::error::ResolveError;
use crate::resolver::{KeyMetadata, KeyResolver, KeyScope, ResolvedKeys};
use keyscope_filters::Predicate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Keyspace {
    /// Soft-deleted keyspaces resolve as not found
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub keys: Vec<KeyMetadata>,
}

/// Resolver backed by a map of keyspace ID to keyspace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryKeyResolver {
    keyspaces: HashMap<String, Keyspace>,
}

impl InMemoryKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{"<keyspaceId>": {"deleted": false, "keys": [...]}, ...}`
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, keyspace_id: impl Into<String>, keyspace: Keyspace) {
        self.keyspaces.insert(keyspace_id.into(), keyspace);
    }

    fn lookup(
        &self,
        scope: &KeyScope,
        predicate: Option<&Predicate>,
    ) -> Result<ResolvedKeys, ResolveError> {
        let keyspace = self
            .keyspaces
            .get(&scope.keyspace_id)
            .filter(|ks| !ks.deleted)
            .ok_or_else(|| ResolveError::NotFound(scope.keyspace_id.clone()))?;

        let keys = keyspace
            .keys
            .iter()
            .filter(|key| predicate.map_or(true, |p| p.matches(*key)))
            .cloned()
            .collect();

        Ok(ResolvedKeys { keys })
    }
}

impl KeyResolver for InMemoryKeyResolver {
    async fn resolve_keys(
        &self,
        scope: &KeyScope,
        predicate: Option<&Predicate>,
    ) -> Result<ResolvedKeys, ResolveError> {
        self.lookup(scope, predicate)
    }
}
