#![allow(dead_code)]

use keyscope_core::ScalarValue;
use keyscope_query::{AggregationExecutor, ExecutorError, ExecutorRequest, InMemoryKeyResolver, QueryInput};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const NOW: i64 = 1_760_000_000_000;

pub type Row = BTreeMap<String, ScalarValue>;

/// Two live keyspaces and a soft-deleted one
pub fn sample_resolver() -> InMemoryKeyResolver {
    InMemoryKeyResolver::from_json(
        r#"{
            "ks_prod": {"keys": [
                {"id": "key_a", "name": "prod-checkout", "identityExternalId": "cus_1"},
                {"id": "key_b", "name": "prod-billing", "ownerId": "cus_1"},
                {"id": "key_c", "name": "staging-checkout", "ownerId": "cus_2"}
            ]},
            "ks_empty": {"keys": []},
            "ks_gone": {"deleted": true, "keys": [{"id": "key_z"}]}
        }"#,
    )
    .expect("valid keyspace fixture")
}

pub fn input(json: &str) -> QueryInput {
    QueryInput::from_json(json).expect("valid query input")
}

pub fn row(pairs: &[(&str, ScalarValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Executor over fixed rows; records every request it receives
pub struct RecordingExecutor {
    pub rows: Vec<Row>,
    pub requests: Mutex<Vec<ExecutorRequest>>,
    pub fail: bool,
}

impl RecordingExecutor {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl AggregationExecutor for RecordingExecutor {
    type Row = Row;

    async fn execute(&self, request: &ExecutorRequest) -> Result<Vec<Row>, ExecutorError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ExecutorError::new("clickhouse unavailable"));
        }
        let predicate = request.predicate();
        Ok(self
            .rows
            .iter()
            .filter(|row| predicate.as_ref().map_or(true, |p| p.matches(*row)))
            .cloned()
            .collect())
    }
}
