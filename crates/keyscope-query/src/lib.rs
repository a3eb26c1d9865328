//! Query assembly between dashboard input and the aggregation executor

mod assembler;
mod config;
mod error;
mod executor;
mod input;
mod memory;
mod pipeline;
mod render;
mod resolver;

pub use assembler::{assemble, ExecutorRequest, KeyFilter, RESOLVED_KEY_IDS};
pub use config::QueryConfig;
pub use error::{ExecutorError, QueryError, ResolveError};
pub use executor::AggregationExecutor;
pub use input::QueryInput;
pub use memory::{InMemoryKeyResolver, Keyspace};
pub use pipeline::{plan_query, AnalyticsQuery};
pub use render::{render_executor_where, render_resolver_where, render_sql, SqlFragment, SqlParam};
pub use resolver::{KeyMetadata, KeyResolver, KeyScope, ResolvedKeys};
