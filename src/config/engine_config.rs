use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SqlDialect};

/// Default bound on nested subqueries / CTEs accepted by the translator.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Ceiling for `max_depth`; equivalence checks stop at the same depth.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Per-tab engine configuration.
///
/// - `dialect` selects the parser grammar and the parameter quoting rules.
/// - `valid_table_names` restricts FROM/JOIN entries to a known schema
///   (`None` accepts any table, as against a live database).
/// - `max_depth` bounds subquery/CTE nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Grammar and literal flavour
    pub dialect: SqlDialect,
    /// Allow-list of table names, `None` for live databases
    pub valid_table_names: Option<Vec<String>>,
    /// Maximum nesting of subqueries and CTEs
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { dialect: SqlDialect::default(), valid_table_names: None, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl EngineConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: configuration for a live database connection; any table
    /// name is accepted.
    pub fn live(dialect: SqlDialect) -> Self {
        Self { dialect, ..Default::default() }
    }

    /// Convenience: configuration for a known sample schema; FROM/JOIN entries
    /// naming other tables are dropped.
    pub fn sample<S: AsRef<str>>(dialect: SqlDialect, tables: &[S]) -> Self {
        Self {
            dialect,
            valid_table_names: Some(tables.iter().map(|t| t.as_ref().to_string()).collect()),
            ..Default::default()
        }
    }

    /// Clamped to [`MAX_NESTING_DEPTH`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_NESTING_DEPTH);
        self
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Load a configuration from its JSON form. Missing keys take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        if config.max_depth == 0 || config.max_depth > MAX_NESTING_DEPTH {
            return Err(ConfigError::InvalidMaxDepth);
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}
