use sqlparser::ast::{Expr, FunctionArg, FunctionArgExpr};

use crate::{model::AggregateFunction, parser::ColumnResolver};

/// What an aggregate call is applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateTarget<'e> {
    Star,
    Column(&'e Expr),
    /// Anything else; modeled as `*`.
    Expression,
}

pub struct AggregateResolver;

impl AggregateResolver {
    /// Recognise `COUNT/SUM/AVG/MIN/MAX(...)` without an OVER clause.
    pub fn detect(expr: &Expr) -> Option<(AggregateFunction, AggregateTarget<'_>)> {
        let expr = Self::unnest(expr);
        let Expr::Function(func) = expr else {
            return None;
        };
        if func.over.is_some() {
            return None;
        }
        let function = AggregateFunction::from_name(&func.name.0.last()?.value)?;
        let target = match func.args.as_slice() {
            [FunctionArg::Unnamed(FunctionArgExpr::Wildcard)] => AggregateTarget::Star,
            [FunctionArg::Unnamed(FunctionArgExpr::Expr(arg))] if ColumnResolver::is_column(arg) => {
                AggregateTarget::Column(arg)
            },
            _ => AggregateTarget::Expression,
        };
        Some((function, target))
    }

    /// Any function call carrying an OVER clause.
    pub fn is_window(expr: &Expr) -> bool {
        matches!(Self::unnest(expr), Expr::Function(func) if func.over.is_some())
    }

    fn unnest(expr: &Expr) -> &Expr {
        match expr {
            Expr::Nested(inner) => Self::unnest(inner),
            other => other,
        }
    }
}
