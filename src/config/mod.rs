pub mod sql_dialect;
pub use sql_dialect::*;

pub mod engine_config;
pub use engine_config::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown SQL dialect '{0}'")]
    UnknownDialect(String),
    #[error("max depth must be between 1 and {}", MAX_NESTING_DEPTH)]
    InvalidMaxDepth,
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
