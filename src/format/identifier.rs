use once_cell::sync::Lazy;
use regex::Regex;

use crate::format::FormatError;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

static QUALIFIED_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$").expect("qualified identifier pattern is valid")
});

/// Allow-list check for a bare table or column name.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Allow-list check for `column` or `table.column`.
pub fn is_valid_qualified_identifier(name: &str) -> bool {
    QUALIFIED_IDENTIFIER.is_match(name)
}

pub fn validate_identifier(name: &str) -> Result<(), FormatError> {
    if is_valid_identifier(name) {
        return Ok(());
    }
    Err(FormatError::InvalidIdentifier(name.to_string()))
}

pub fn validate_qualified_identifier(name: &str) -> Result<(), FormatError> {
    if is_valid_qualified_identifier(name) {
        return Ok(());
    }
    Err(FormatError::InvalidIdentifier(name.to_string()))
}

/// Emit `name` bare when it passes the allow-list, otherwise as a
/// double-quoted identifier.
pub fn quote_identifier(name: &str) -> String {
    if is_valid_identifier(name) || name == "*" {
        return name.to_string();
    }
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `table.column` with each part quoted as needed.
pub fn qualified_name(table: &str, column: &str) -> String {
    format!("{}.{}", quote_identifier(table), quote_identifier(column))
}

/// Quote every dot-separated part of an already-qualified column reference.
pub fn quote_column_ref(column: &str) -> String {
    match column.split_once('.') {
        Some((table, name)) => qualified_name(table, name),
        None => quote_identifier(column),
    }
}
