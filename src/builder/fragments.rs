//! Small pieces of SQL text shared by the clause writers.

use crate::format::{format_literal, is_valid_identifier, quote_column_ref};

/// Prefix every non-empty line with `width` spaces.
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", pad, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `expr AS alias`, or `expr` alone.
pub fn with_alias(expr: String, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("{} AS {}", expr, crate::format::quote_identifier(alias)),
        None => expr,
    }
}

/// A `table.column` value whose table is in scope is a column reference
/// (typically a correlated one) and is emitted bare.
pub fn is_column_reference(value: &str, scope: &[&str]) -> bool {
    match value.split_once('.') {
        Some((table, column)) => scope.contains(&table) && is_valid_identifier(column),
        None => false,
    }
}

/// Right-hand side of a plain comparison.
pub fn comparison_value(value: &str, scope: &[&str]) -> String {
    if is_column_reference(value, scope) {
        return quote_column_ref(value);
    }
    format_literal(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("SELECT a\n\nFROM t", 2), "  SELECT a\n\n  FROM t");
    }

    #[test]
    fn test_comparison_value() {
        let scope = ["orders", "customers"];
        assert_eq!(comparison_value("customers.id", &scope), "customers.id");
        assert_eq!(comparison_value("ghost.id", &scope), "'ghost.id'");
        assert_eq!(comparison_value("1.5", &scope), "1.5");
        assert_eq!(comparison_value("USA", &scope), "'USA'");
        assert_eq!(comparison_value("{{id}}", &scope), "{{id}}");
    }

    #[test]
    fn test_with_alias() {
        assert_eq!(with_alias("COUNT(*)".into(), Some("n")), "COUNT(*) AS n");
        assert_eq!(with_alias("COUNT(*)".into(), None), "COUNT(*)");
    }
}
