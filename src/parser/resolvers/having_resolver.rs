use sqlparser::ast::Expr;
use tracing::debug;

use crate::{
    model::{Connector, HavingCondition, HavingOperator, ParsedQuery, Subquery, SubqueryRole},
    parser::{
        AggregateResolver, AggregateTarget, ColumnResolver, LiteralResolver, ParseError, PredicateResolver,
        QueryTranslator, TranslationContext,
    },
};

/// HAVING clause: `AGG(column|*) op value|subquery` chains.
pub struct HavingResolver;

impl HavingResolver {
    pub fn resolve(expr: &Expr, query: &mut ParsedQuery, ctx: &TranslationContext) -> Result<(), ParseError> {
        let mut leaves = Vec::new();
        PredicateResolver::flatten(expr, Connector::And, &mut leaves);
        for (connector, leaf) in leaves {
            if !Self::resolve_leaf(leaf, connector, query, ctx)? {
                debug!(predicate = %leaf, "HAVING condition not modeled, dropped");
            }
        }
        Ok(())
    }

    fn resolve_leaf(expr: &Expr, connector: Connector, query: &mut ParsedQuery, ctx: &TranslationContext) -> Result<bool, ParseError> {
        let Expr::BinaryOp { left, op, right } = expr else {
            return Ok(false);
        };
        let Some(operator) = PredicateResolver::comparison(op) else {
            return Ok(false);
        };
        let (aggregate, operator, rhs) = match (AggregateResolver::detect(left), AggregateResolver::detect(right)) {
            (Some(aggregate), _) => (aggregate, operator, right),
            (None, Some(aggregate)) => (aggregate, PredicateResolver::mirror(operator), left),
            (None, None) => return Ok(false),
        };
        let Ok(operator) = HavingOperator::try_from(operator) else {
            return Ok(false);
        };

        let (function, target) = aggregate;
        let column = match target {
            AggregateTarget::Column(arg) => match ColumnResolver::qualified(arg, query, ctx) {
                Some(column) => column,
                None => return Ok(false),
            },
            AggregateTarget::Star | AggregateTarget::Expression => "*".to_string(),
        };
        let mut condition = HavingCondition::new(function, &column, operator, "").with_connector(connector);

        if let Some(subquery) = PredicateResolver::as_subquery(rhs) {
            let inner = QueryTranslator::translate_nested(subquery, ctx)?;
            let index = query.subqueries.len();
            query.subqueries.push(Subquery::new(format!("subquery_{}", index), SubqueryRole::Where, inner));
            condition.subquery_index = Some(index);
        } else {
            match LiteralResolver::value_text(rhs, query, ctx) {
                Some(value) => condition.value = value,
                None => return Ok(false),
            }
        }
        query.having.push(condition);
        Ok(true)
    }
}
