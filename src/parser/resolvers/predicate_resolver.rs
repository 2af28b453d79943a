use sqlparser::ast::{BinaryOperator, Expr, Query};
use tracing::debug;

use crate::{
    model::{Connector, FilterOperator, ParsedQuery, QueryFilter, Subquery, SubqueryRole},
    parser::{ColumnResolver, LiteralResolver, ParseError, QueryTranslator, TranslationContext},
};

/// WHERE clause: AND/OR chains flattened into `filters`.
pub struct PredicateResolver;

impl PredicateResolver {
    pub fn resolve_where(expr: &Expr, query: &mut ParsedQuery, ctx: &TranslationContext) -> Result<(), ParseError> {
        let mut leaves = Vec::new();
        Self::flatten(expr, Connector::And, &mut leaves);
        for (connector, leaf) in leaves {
            Self::resolve_leaf(leaf, connector, query, ctx)?;
        }
        Ok(())
    }

    /// Split an AND/OR tree into `(connector to previous, predicate)` pairs in
    /// textual order. Parenthesised groups are flattened as well, so their
    /// grouping is lost.
    pub fn flatten<'e>(expr: &'e Expr, connector: Connector, out: &mut Vec<(Connector, &'e Expr)>) {
        match expr {
            Expr::BinaryOp { left, op: BinaryOperator::And, right } => {
                Self::flatten(left, connector, out);
                Self::flatten(right, Connector::And, out);
            },
            Expr::BinaryOp { left, op: BinaryOperator::Or, right } => {
                Self::flatten(left, connector, out);
                Self::flatten(right, Connector::Or, out);
            },
            Expr::Nested(inner) => Self::flatten(inner, connector, out),
            other => out.push((connector, other)),
        }
    }

    /// Comparison operator of a binary expression, if it is one.
    pub fn comparison(op: &BinaryOperator) -> Option<FilterOperator> {
        match op {
            BinaryOperator::Eq => Some(FilterOperator::Eq),
            BinaryOperator::NotEq => Some(FilterOperator::NotEq),
            BinaryOperator::Gt => Some(FilterOperator::Gt),
            BinaryOperator::Lt => Some(FilterOperator::Lt),
            BinaryOperator::GtEq => Some(FilterOperator::GtEq),
            BinaryOperator::LtEq => Some(FilterOperator::LtEq),
            _ => None,
        }
    }

    /// `5 < x` is stored as `x > 5`.
    pub fn mirror(op: FilterOperator) -> FilterOperator {
        match op {
            FilterOperator::Gt => FilterOperator::Lt,
            FilterOperator::Lt => FilterOperator::Gt,
            FilterOperator::GtEq => FilterOperator::LtEq,
            FilterOperator::LtEq => FilterOperator::GtEq,
            other => other,
        }
    }

    fn resolve_leaf(expr: &Expr, connector: Connector, query: &mut ParsedQuery, ctx: &TranslationContext) -> Result<(), ParseError> {
        match expr {
            Expr::BinaryOp { left, op, right } => {
                let Some(operator) = Self::comparison(op) else {
                    Self::dropped(expr);
                    return Ok(());
                };
                let (column, operator, rhs) = if ColumnResolver::is_column(left) {
                    (left, operator, right)
                } else if ColumnResolver::is_column(right) {
                    (right, Self::mirror(operator), left)
                } else {
                    Self::dropped(expr);
                    return Ok(());
                };
                let Some(column) = ColumnResolver::qualified(column, query, ctx) else {
                    Self::dropped(expr);
                    return Ok(());
                };
                if let Some(subquery) = Self::as_subquery(rhs) {
                    return Self::push_subquery_filter(column, operator, subquery, connector, query, ctx);
                }
                match LiteralResolver::value_text(rhs, query, ctx) {
                    Some(value) => Self::push(column, operator, value, connector, query),
                    None => Self::dropped(expr),
                }
            },
            Expr::IsNull(inner) | Expr::IsNotNull(inner) => {
                let operator = match expr {
                    Expr::IsNull(_) => FilterOperator::IsNull,
                    _ => FilterOperator::IsNotNull,
                };
                match ColumnResolver::qualified(inner, query, ctx) {
                    Some(column) => Self::push(column, operator, String::new(), connector, query),
                    None => Self::dropped(expr),
                }
            },
            Expr::InList { expr: inner, list, negated } => {
                let operator = if *negated { FilterOperator::NotIn } else { FilterOperator::In };
                let column = ColumnResolver::qualified(inner, query, ctx);
                let items: Option<Vec<String>> = list.iter()
                    .map(|item| LiteralResolver::sql_text(item, query, ctx))
                    .collect();
                match (column, items) {
                    (Some(column), Some(items)) => Self::push(column, operator, items.join(", "), connector, query),
                    _ => Self::dropped(expr),
                }
            },
            Expr::InSubquery { expr: inner, subquery, negated } => {
                let operator = if *negated { FilterOperator::NotIn } else { FilterOperator::In };
                match ColumnResolver::qualified(inner, query, ctx) {
                    Some(column) => return Self::push_subquery_filter(column, operator, subquery, connector, query, ctx),
                    None => Self::dropped(expr),
                }
            },
            Expr::Between { expr: inner, negated: false, low, high } => {
                let column = ColumnResolver::qualified(inner, query, ctx);
                let low = LiteralResolver::sql_text(low, query, ctx);
                let high = LiteralResolver::sql_text(high, query, ctx);
                match (column, low, high) {
                    (Some(column), Some(low), Some(high)) => {
                        Self::push(column, FilterOperator::Between, format!("{} AND {}", low, high), connector, query)
                    },
                    _ => Self::dropped(expr),
                }
            },
            Expr::Like { negated, expr: inner, pattern, .. } => {
                let operator = if *negated { FilterOperator::NotLike } else { FilterOperator::Like };
                let column = ColumnResolver::qualified(inner, query, ctx);
                let pattern = LiteralResolver::value_text(pattern, query, ctx);
                match (column, pattern) {
                    (Some(column), Some(pattern)) => Self::push(column, operator, pattern, connector, query),
                    _ => Self::dropped(expr),
                }
            },
            _ => Self::dropped(expr),
        }
        Ok(())
    }

    fn push(column: String, operator: FilterOperator, value: String, connector: Connector, query: &mut ParsedQuery) {
        query.filters.push(QueryFilter { column, operator, value, connector, subquery_index: None });
    }

    fn push_subquery_filter(
        column: String,
        operator: FilterOperator,
        subquery: &Query,
        connector: Connector,
        query: &mut ParsedQuery,
        ctx: &TranslationContext,
    ) -> Result<(), ParseError> {
        let inner = QueryTranslator::translate_nested(subquery, ctx)?;
        let filter_index = query.filters.len();
        let subquery_index = query.subqueries.len();
        query.subqueries.push(
            Subquery::new(format!("subquery_{}", subquery_index), SubqueryRole::Where, inner).linked_to(filter_index)
        );
        query.filters.push(QueryFilter {
            column,
            operator,
            value: String::new(),
            connector,
            subquery_index: Some(subquery_index),
        });
        Ok(())
    }

    pub(crate) fn as_subquery(expr: &Expr) -> Option<&Query> {
        match expr {
            Expr::Subquery(query) => Some(query.as_ref()),
            Expr::Nested(inner) => Self::as_subquery(inner),
            _ => None,
        }
    }

    fn dropped(expr: &Expr) {
        debug!(predicate = %expr, "predicate not modeled, dropped");
    }
}
