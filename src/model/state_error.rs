use std::fmt;

use crate::format::FormatError;
use crate::model::FilterOperator;

/// Rejected edit on a [`VisualQueryState`](crate::model::VisualQueryState).
/// The state is left unchanged whenever one of these is returned.
#[derive(Debug)]
pub enum StateError {
    InvalidIdentifier(String),
    UnknownTable(String),
    DuplicateTable(String),
    DuplicateCte(String),
    NoTableForColumn(String),
    CyclicJoin { source: String, target: String },
    IndexOutOfRange { kind: &'static str, index: usize, len: usize },
    SubqueryNotAllowed(FilterOperator),
    Json(serde_json::Error),
}

// Display/Error are written by hand because thiserror treats a field named
// `source` as the error source, which `CyclicJoin` does not mean.
impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::InvalidIdentifier(name) => write!(f, "'{name}' is not a valid identifier"),
            StateError::UnknownTable(name) => write!(f, "table '{name}' is not on the canvas"),
            StateError::DuplicateTable(name) => write!(f, "table '{name}' is already on the canvas"),
            StateError::DuplicateCte(name) => write!(f, "a CTE named '{name}' already exists"),
            StateError::NoTableForColumn(name) => write!(f, "column '{name}' needs a table on the canvas"),
            StateError::CyclicJoin { source, target } => {
                write!(f, "joining '{target}' from '{source}' would close a join cycle")
            }
            StateError::IndexOutOfRange { kind, index, len } => {
                write!(f, "{kind} index {index} is out of range ({len} present)")
            }
            StateError::SubqueryNotAllowed(op) => write!(f, "operator {op} cannot take a subquery"),
            StateError::Json(err) => write!(f, "invalid visual state JSON: {err}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Json(err)
    }
}

impl From<FormatError> for StateError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::InvalidIdentifier(name) => StateError::InvalidIdentifier(name),
        }
    }
}

impl StateError {
    pub(crate) fn out_of_range(kind: &'static str, index: usize, len: usize) -> Self {
        StateError::IndexOutOfRange { kind, index, len }
    }
}
