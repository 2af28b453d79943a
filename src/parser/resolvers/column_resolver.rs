use sqlparser::ast::{Expr, Ident};
use tracing::debug;

use crate::{
    model::ParsedQuery,
    parser::{TemplateMask, TranslationContext},
};

pub struct ColumnResolver;

impl ColumnResolver {
    /// Identifier chain of a plain column reference. Masked `{{name}}`
    /// placeholders are values, not columns.
    pub fn column_parts(expr: &Expr) -> Option<Vec<&Ident>> {
        match expr {
            Expr::Identifier(ident) => match TemplateMask::placeholder(&ident.value) {
                Some(_) => None,
                None => Some(vec![ident]),
            },
            Expr::CompoundIdentifier(parts) if !parts.is_empty() => Some(parts.iter().collect()),
            Expr::Nested(inner) => Self::column_parts(inner),
            _ => None,
        }
    }

    pub fn is_column(expr: &Expr) -> bool {
        Self::column_parts(expr).is_some()
    }

    /// Resolve a column reference to `(table, column)` where `table` is the
    /// name the table carries in `query.tables` (or in an enclosing query).
    ///
    /// Unqualified names go to the first table whose schema has the column,
    /// falling back to the anchor table when no schema claims it.
    pub fn resolve(expr: &Expr, query: &ParsedQuery, ctx: &TranslationContext) -> Option<(String, String)> {
        let parts = Self::column_parts(expr)?;
        let column = parts.last()?.value.clone();
        if parts.len() == 1 {
            return Self::resolve_unqualified(&column, query, ctx).map(|table| (table, column));
        }

        let qualifier = &parts[parts.len() - 2].value;
        match ctx.resolve_collection(qualifier) {
            Some(table) => Some((table.to_string(), column)),
            None => {
                debug!(qualifier = %qualifier, column = %column, "column qualifier names no table in scope");
                None
            },
        }
    }

    /// `table.column` form of [`resolve`](Self::resolve).
    pub fn qualified(expr: &Expr, query: &ParsedQuery, ctx: &TranslationContext) -> Option<String> {
        Self::resolve(expr, query, ctx).map(|(table, column)| format!("{}.{}", table, column))
    }

    fn resolve_unqualified(column: &str, query: &ParsedQuery, ctx: &TranslationContext) -> Option<String> {
        for table in &query.tables {
            let known = ctx.columns_of(&table.table_name)
                .is_some_and(|columns| columns.iter().any(|c| c.eq_ignore_ascii_case(column)));
            if known {
                return Some(table.table_name.clone());
            }
        }
        query.anchor().map(|table| table.table_name.clone())
    }
}
