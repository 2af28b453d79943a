use sqlparser::parser::ParserError;
use thiserror::Error;

/// Why a piece of SQL text could not be turned into a [`ParsedQuery`](crate::model::ParsedQuery).
///
/// Callers keep their last good model when they get one of these; the
/// message is for logs, never for the editor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("expected a SELECT statement, found {0}")]
    NotASelect(String),
    #[error("expected a single statement, found {0}")]
    MultipleStatements(usize),
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    #[error("subqueries nested deeper than {0} levels")]
    DepthExceeded(usize),
}

impl ParseError {
    pub(crate) fn from_parser(err: ParserError, max_depth: usize) -> Self {
        match err {
            ParserError::RecursionLimitExceeded => ParseError::DepthExceeded(max_depth),
            ParserError::TokenizerError(message) | ParserError::ParserError(message) => ParseError::Syntax(message),
        }
    }
}
