use sqlparser::ast::{Expr, SelectItem};
use tracing::debug;

use crate::{
    model::{ALL_COLUMNS, ColumnAggregate, ParsedQuery, SelectAggregate, Subquery, SubqueryRole},
    parser::{AggregateResolver, AggregateTarget, ColumnResolver, ParseError, QueryTranslator, TranslationContext, WildcardResolver},
};

/// SELECT list: column selections, aggregates and scalar subqueries.
pub struct ProjectionResolver;

impl ProjectionResolver {
    pub fn resolve(items: &[SelectItem], query: &mut ParsedQuery, ctx: &TranslationContext) -> Result<(), ParseError> {
        for item in items {
            match item {
                SelectItem::Wildcard(_) => WildcardResolver::expand_all(query, ctx),
                SelectItem::QualifiedWildcard(name, _) => WildcardResolver::expand_table(name, query, ctx),
                SelectItem::UnnamedExpr(expr) => Self::resolve_expr(expr, None, query, ctx)?,
                SelectItem::ExprWithAlias { expr, alias } => Self::resolve_expr(expr, Some(&alias.value), query, ctx)?,
            }
        }
        Ok(())
    }

    fn resolve_expr(expr: &Expr, alias: Option<&str>, query: &mut ParsedQuery, ctx: &TranslationContext) -> Result<(), ParseError> {
        if ColumnResolver::is_column(expr) {
            Self::select_column(expr, query, ctx);
            return Ok(());
        }
        if AggregateResolver::is_window(expr) {
            debug!(expression = %expr, "window function dropped");
            return Ok(());
        }
        if let Some((function, target)) = AggregateResolver::detect(expr) {
            match target {
                AggregateTarget::Column(arg) => match Self::select_column(arg, query, ctx) {
                    Some((table, column)) => {
                        query.column_aggregates.push(ColumnAggregate::new(function, &table, &column, alias));
                    },
                    None => debug!(expression = %expr, "aggregate column names no table in FROM"),
                },
                AggregateTarget::Star | AggregateTarget::Expression => {
                    query.select_aggregates.push(SelectAggregate::star(function, alias));
                },
            }
            return Ok(());
        }
        if let Expr::Subquery(inner) = Self::unnest(expr) {
            let parsed = QueryTranslator::translate_nested(inner, ctx)?;
            let index = query.subqueries.len();
            let mut subquery = Subquery::new(format!("subquery_{}", index), SubqueryRole::Select, parsed);
            subquery.alias = alias.map(str::to_string);
            query.subqueries.push(subquery);
            return Ok(());
        }
        debug!(expression = %expr, "SELECT item not modeled");
        Ok(())
    }

    /// Mark a column reference as selected on its table.
    fn select_column(expr: &Expr, query: &mut ParsedQuery, ctx: &TranslationContext) -> Option<(String, String)> {
        let (table, column) = ColumnResolver::resolve(expr, query, ctx)?;
        let entry = query.tables.iter_mut().find(|t| t.table_name == table)?;
        entry.selected_columns.insert(&column);
        Some((table, column))
    }

    /// Names a nested query exposes to the query around it.
    pub fn output_columns(query: &ParsedQuery) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if name != ALL_COLUMNS && !columns.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                columns.push(name.to_string());
            }
        };
        for table in &query.tables {
            table.selected_columns.iter().for_each(|c| push(c.as_str()));
        }
        for aggregate in &query.column_aggregates {
            if let Some(alias) = &aggregate.alias {
                push(alias.as_str());
            }
        }
        for aggregate in &query.select_aggregates {
            if let Some(alias) = &aggregate.alias {
                push(alias.as_str());
            }
        }
        for subquery in query.subqueries.iter().filter(|s| s.role == SubqueryRole::Select) {
            if let Some(alias) = &subquery.alias {
                push(alias.as_str());
            }
        }
        columns
    }

    fn unnest(expr: &Expr) -> &Expr {
        match expr {
            Expr::Nested(inner) => Self::unnest(inner),
            other => other,
        }
    }
}
