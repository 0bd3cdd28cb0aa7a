use crate::pool::TargetId;

/// Errors from pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error(
        "pool exhausted: {requested} bytes requested with {current} in use (hard limit {hard_limit})"
    )]
    Exhausted {
        requested: u64,
        current: u64,
        hard_limit: u64,
    },
    #[error("{0} is not on loan")]
    NotOnLoan(TargetId),
    #[error("soft limit {soft} exceeds hard limit {hard}")]
    InvalidLimits { soft: u64, hard: u64 },
    #[error("target factory failed: {0}")]
    Factory(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid pool config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid pool config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
