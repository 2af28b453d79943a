use sqlparser::ast::{Expr, OrderByExpr};
use tracing::debug;

use crate::{
    model::{OrderByColumn, ParsedQuery, SortDirection},
    parser::{ColumnResolver, TranslationContext},
};

pub struct OrderByResolver;

impl OrderByResolver {
    pub fn resolve(order_by: &[OrderByExpr], query: &mut ParsedQuery, ctx: &TranslationContext) {
        for item in order_by {
            let direction = match item.asc {
                Some(false) => SortDirection::Desc,
                _ => SortDirection::Asc,
            };
            let column = Self::projection_alias(&item.expr, query)
                .or_else(|| ColumnResolver::qualified(&item.expr, query, ctx));
            match column {
                Some(column) => query.order_by.push(OrderByColumn { column, direction }),
                None => debug!(expression = %item.expr, "ORDER BY item not modeled"),
            }
        }
    }

    /// An unqualified name matching an aggregate or scalar-subquery alias is
    /// kept verbatim instead of being resolved against a table.
    fn projection_alias(expr: &Expr, query: &ParsedQuery) -> Option<String> {
        let Expr::Identifier(ident) = expr else {
            return None;
        };
        query.projection_alias(&ident.value).map(str::to_string)
    }
}
