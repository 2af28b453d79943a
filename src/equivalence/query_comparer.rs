use tracing::trace;

use crate::{
    config::MAX_NESTING_DEPTH,
    equivalence::ValueNormalizer,
    model::{CommonTableExpression, HavingCondition, ParsedQuery, QueryFilter, QueryTable, Subquery},
};

/// Deeper trees than this are reported as not equivalent. No configuration
/// lets the translator accept a deeper tree.
pub const MAX_COMPARE_DEPTH: usize = MAX_NESTING_DEPTH;

/// Structural equality of two query trees.
///
/// Ignores what the SQL text cannot carry: table aliases, generated ids and
/// the connector of the first filter or having condition. Everything else,
/// order included, has to match.
pub struct QueryComparer;

impl QueryComparer {
    pub fn equivalent(a: &ParsedQuery, b: &ParsedQuery) -> bool {
        Self::compare(a, b, 0)
    }

    fn compare(a: &ParsedQuery, b: &ParsedQuery, depth: usize) -> bool {
        if depth > MAX_COMPARE_DEPTH {
            trace!(depth, "comparison depth exceeded");
            return false;
        }
        let flat = a.limit == b.limit &&
            a.offset == b.offset &&
            a.distinct == b.distinct &&
            a.joins == b.joins &&
            a.group_by == b.group_by &&
            a.order_by == b.order_by &&
            a.select_aggregates == b.select_aggregates &&
            a.column_aggregates == b.column_aggregates &&
            Self::pairwise(&a.tables, &b.tables, Self::same_table);
        if !flat {
            return false;
        }

        Self::pairwise(&a.ctes, &b.ctes, |x, y| Self::same_cte(x, y, depth)) &&
            Self::pairwise(&a.subqueries, &b.subqueries, |x, y| Self::same_subquery(x, y, depth)) &&
            a.filters.len() == b.filters.len() &&
            a.filters.iter().zip(&b.filters).enumerate()
                .all(|(i, (x, y))| Self::same_filter(i, x, y, a, b, depth)) &&
            a.having.len() == b.having.len() &&
            a.having.iter().zip(&b.having).enumerate()
                .all(|(i, (x, y))| Self::same_having(i, x, y, a, b, depth))
    }

    fn pairwise<T>(a: &[T], b: &[T], same: impl Fn(&T, &T) -> bool) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same(x, y))
    }

    fn same_table(a: &QueryTable, b: &QueryTable) -> bool {
        a.table_name == b.table_name &&
            a.is_cte_reference == b.is_cte_reference &&
            a.selected_columns.sorted() == b.selected_columns.sorted()
    }

    fn same_cte(a: &CommonTableExpression, b: &CommonTableExpression, depth: usize) -> bool {
        a.name == b.name && Self::compare(&a.inner_query, &b.inner_query, depth + 1)
    }

    fn same_subquery(a: &Subquery, b: &Subquery, depth: usize) -> bool {
        a.role == b.role &&
            a.alias == b.alias &&
            a.linked_filter_index == b.linked_filter_index &&
            Self::compare(&a.inner_query, &b.inner_query, depth + 1)
    }

    fn same_filter(index: usize, x: &QueryFilter, y: &QueryFilter, a: &ParsedQuery, b: &ParsedQuery, depth: usize) -> bool {
        if x.column != y.column || x.operator != y.operator {
            return false;
        }
        if index > 0 && x.connector != y.connector {
            return false;
        }
        match (x.subquery_index, y.subquery_index) {
            (None, None) => {
                ValueNormalizer::normalize(x.operator, &x.value) == ValueNormalizer::normalize(y.operator, &y.value)
            },
            (Some(i), Some(j)) => Self::same_nested(a.subqueries.get(i), b.subqueries.get(j), depth),
            _ => false,
        }
    }

    fn same_having(index: usize, x: &HavingCondition, y: &HavingCondition, a: &ParsedQuery, b: &ParsedQuery, depth: usize) -> bool {
        if x.aggregate_function != y.aggregate_function || x.column != y.column || x.operator != y.operator {
            return false;
        }
        if index > 0 && x.connector != y.connector {
            return false;
        }
        match (x.subquery_index, y.subquery_index) {
            (None, None) => {
                let operator = x.operator.into();
                ValueNormalizer::normalize(operator, &x.value) == ValueNormalizer::normalize(operator, &y.value)
            },
            (Some(i), Some(j)) => Self::same_nested(a.subqueries.get(i), b.subqueries.get(j), depth),
            _ => false,
        }
    }

    /// Dangling indices on both sides count as equal; only one side
    /// dangling does not.
    fn same_nested(a: Option<&Subquery>, b: Option<&Subquery>, depth: usize) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => Self::compare(&a.inner_query, &b.inner_query, depth + 1),
            (None, None) => true,
            _ => false,
        }
    }
}
