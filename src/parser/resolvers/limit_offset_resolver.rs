use sqlparser::ast::{Expr, Query, Value};
use tracing::debug;

use crate::{
    model::{ParsedQuery, QueryLimit},
    parser::TemplateMask,
};

pub struct LimitOffsetResolver;

impl LimitOffsetResolver {
    pub fn resolve(source: &Query, query: &mut ParsedQuery) {
        if let Some(limit) = &source.limit {
            query.limit = match limit {
                Expr::Value(Value::Number(n, _)) => n.parse::<u64>().ok().map(QueryLimit::Count),
                Expr::Identifier(ident) => TemplateMask::placeholder(&ident.value).map(QueryLimit::Parameter),
                _ => None,
            };
            if query.limit.is_none() {
                debug!(limit = %limit, "LIMIT is neither a count nor a placeholder");
            }
        }
        if let Some(offset) = &source.offset {
            query.offset = match &offset.value {
                Expr::Value(Value::Number(n, _)) => n.parse::<u64>().ok(),
                _ => None,
            };
            if query.offset.is_none() {
                debug!(offset = %offset.value, "OFFSET is not a count");
            }
        }
    }
}
