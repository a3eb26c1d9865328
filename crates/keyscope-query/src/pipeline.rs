//! End-to-end query pipeline
//!
//! window -> compile -> (key-scoped) resolve keys -> assemble -> execute

use crate::assembler::{assemble, ExecutorRequest};
use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::executor::AggregationExecutor;
use crate::input::QueryInput;
use crate::resolver::{KeyResolver, KeyScope};
use keyscope_filters::{build_resolver_predicate, compile, fields, Domain};

/// Build the executor request for `input` without executing it.
///
/// Key-scoped domains require a keyspace and consult `resolver` exactly once.
pub async fn plan_query<R: KeyResolver>(
    resolver: &R,
    domain: Domain,
    input: &QueryInput,
    now: i64,
) -> Result<ExecutorRequest, QueryError> {
    let window = input.resolve_window(domain.granularity_context(), now);
    let groups = input.filter_groups();
    let compiled = compile(domain, &groups);

    let resolved = if domain.is_key_scoped() {
        let keyspace_id = input.keyspace_id.as_deref().ok_or_else(|| {
            QueryError::InvalidInput(format!("keyspaceId is required for {} queries", domain))
        })?;
        let predicate = build_resolver_predicate(&compiled, groups.get(fields::IDENTITIES));
        let keys = resolver
            .resolve_keys(&KeyScope::new(keyspace_id), predicate.as_ref())
            .await?;
        tracing::debug!(keyspace_id, keys = keys.keys.len(), "resolved keys");
        Some(keys)
    } else {
        None
    };

    Ok(assemble(
        resolved.as_ref(),
        compiled.get(fields::KEY_IDS),
        &compiled,
        window,
    ))
}

/// Query service over a key resolver and an aggregation executor
#[derive(Debug)]
pub struct AnalyticsQuery<R, E> {
    resolver: R,
    executor: E,
    config: QueryConfig,
}

impl<R, E> AnalyticsQuery<R, E>
where
    R: KeyResolver,
    E: AggregationExecutor,
{
    pub fn new(resolver: R, executor: E, config: QueryConfig) -> Self {
        Self {
            resolver,
            executor,
            config,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn plan(
        &self,
        domain: Domain,
        input: &QueryInput,
        now: i64,
    ) -> Result<ExecutorRequest, QueryError> {
        plan_query(&self.resolver, domain, input, now).await
    }

    /// Plan and execute. A request bounded to zero keys returns no rows
    /// without reaching the executor.
    pub async fn run(
        &self,
        domain: Domain,
        input: &QueryInput,
        now: i64,
    ) -> Result<Vec<E::Row>, QueryError> {
        let request = self.plan(domain, input, now).await?;

        if self.config.short_circuit_empty_scope && request.matches_nothing() {
            tracing::info!(%domain, "key scope is empty, skipping aggregation");
            return Ok(Vec::new());
        }

        let rows = self.executor.execute(&request).await?;
        Ok(rows)
    }
}
