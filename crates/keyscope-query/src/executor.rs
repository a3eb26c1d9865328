//! Aggregation executor seam

use crate::assembler::ExecutorRequest;
use crate::error::ExecutorError;
use std::future::Future;

/// Columnar store that runs the bucketed aggregation. Calls are single-shot;
/// the pipeline never retries them.
pub trait AggregationExecutor: Send + Sync {
    type Row: Send;

    fn execute(
        &self,
        request: &ExecutorRequest,
    ) -> impl Future<Output = Result<Vec<Self::Row>, ExecutorError>> + Send;
}
