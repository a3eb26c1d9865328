//! Key resolver seam
//!
//! The row store that knows which keys live in a keyspace sits behind this
//! trait. The pipeline calls it once per key-scoped query.

use crate::error::ResolveError;
use keyscope_filters::{fields, Predicate, Record};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Keyspace a query is bounded to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyScope {
    pub keyspace_id: String,
}

impl KeyScope {
    pub fn new(keyspace_id: impl Into<String>) -> Self {
        Self {
            keyspace_id: keyspace_id.into(),
        }
    }
}

/// Key row as seen by predicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetadata {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Legacy owner field on the key
    #[serde(default)]
    pub owner_id: Option<String>,
    /// External ID of the linked identity
    #[serde(default)]
    pub identity_external_id: Option<String>,
}

impl KeyMetadata {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            owner_id: None,
            identity_external_id: None,
        }
    }
}

impl Record for KeyMetadata {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            fields::KEY_IDS => Some(self.id.clone()),
            fields::NAMES => self.name.clone(),
            fields::OWNER_ID => self.owner_id.clone(),
            fields::IDENTITY_EXTERNAL_ID => self.identity_external_id.clone(),
            _ => None,
        }
    }
}

/// Keys found for a scope. An empty list is a valid answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedKeys {
    pub keys: Vec<KeyMetadata>,
}

impl ResolvedKeys {
    pub fn ids(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub trait KeyResolver: Send + Sync {
    /// Keys of `scope` matching `predicate` (all keys when `None`)
    fn resolve_keys(
        &self,
        scope: &KeyScope,
        predicate: Option<&Predicate>,
    ) -> impl Future<Output = Result<ResolvedKeys, ResolveError>> + Send;
}
