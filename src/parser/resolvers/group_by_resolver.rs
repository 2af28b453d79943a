use sqlparser::ast::GroupByExpr;
use tracing::debug;

use crate::{
    model::{GroupByColumn, ParsedQuery},
    parser::{ColumnResolver, TranslationContext},
};

pub struct GroupByResolver;

impl GroupByResolver {
    pub fn resolve(group_by: &GroupByExpr, query: &mut ParsedQuery, ctx: &TranslationContext) {
        let exprs = match group_by {
            GroupByExpr::Expressions(exprs) => exprs,
            GroupByExpr::All => {
                debug!("GROUP BY ALL not modeled");
                return;
            },
        };
        for expr in exprs {
            match ColumnResolver::qualified(expr, query, ctx) {
                Some(column) => query.group_by.push(GroupByColumn { column }),
                None => debug!(expression = %expr, "GROUP BY item not modeled"),
            }
        }
    }
}
