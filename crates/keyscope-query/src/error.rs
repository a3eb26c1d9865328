//! Error types for the query pipeline

/// Failure reported by a key resolver
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The keyspace does not exist or was soft-deleted
    #[error("keyspace not found: {0}")]
    NotFound(String),
    #[error("key lookup failed: {0}")]
    Backend(String),
}

/// Failure reported by an aggregation executor
#[derive(Debug, thiserror::Error)]
#[error("aggregation failed: {message}")]
pub struct ExecutorError {
    pub message: String,
}

impl ExecutorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error surfaced to callers of the pipeline
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid query input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ResolveError> for QueryError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(scope) => QueryError::NotFound(scope),
            ResolveError::Backend(message) => {
                QueryError::Internal(format!("key lookup failed: {}", message))
            }
        }
    }
}

impl From<ExecutorError> for QueryError {
    fn from(err: ExecutorError) -> Self {
        QueryError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::InvalidInput(err.to_string())
    }
}
