use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::is_parameter_placeholder;

/// Row limit: a literal count or a `{{name}}` placeholder filled at execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryLimit {
    Count(u64),
    Parameter(String),
}

impl QueryLimit {
    /// Read a LIMIT value as typed by the user. Anything that is neither a
    /// non-negative integer nor a single placeholder is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(count) = trimmed.parse::<u64>() {
            return Some(QueryLimit::Count(count));
        }
        if is_parameter_placeholder(trimmed) {
            return Some(QueryLimit::Parameter(trimmed.to_string()));
        }
        None
    }
}

impl fmt::Display for QueryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryLimit::Count(count) => write!(f, "{}", count),
            QueryLimit::Parameter(name) => f.write_str(name),
        }
    }
}

impl From<u64> for QueryLimit {
    fn from(count: u64) -> Self {
        QueryLimit::Count(count)
    }
}
