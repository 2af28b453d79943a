use sqlparser::ast::{BinaryOperator, Expr, Join, JoinConstraint, JoinOperator};
use tracing::debug;

use crate::{
    model::{JoinType, ParsedQuery, QueryJoin},
    parser::{ColumnResolver, TranslationContext},
};

pub struct JoinResolver;

impl JoinResolver {
    /// Record the join that introduced `joined`. Only a single
    /// `a.x = b.y` equality is modeled; any other predicate keeps both
    /// tables but records no join.
    pub fn resolve(join: &Join, joined: &str, query: &mut ParsedQuery, ctx: &TranslationContext) {
        let (join_type, constraint) = match &join.join_operator {
            JoinOperator::Inner(constraint) => (JoinType::Inner, constraint),
            JoinOperator::LeftOuter(constraint) => (JoinType::Left, constraint),
            JoinOperator::RightOuter(constraint) => (JoinType::Right, constraint),
            JoinOperator::FullOuter(constraint) => (JoinType::Full, constraint),
            JoinOperator::CrossJoin => return,
            other => {
                debug!(table = joined, operator = ?other, "join kind not modeled");
                return;
            },
        };
        let JoinConstraint::On(on) = constraint else {
            debug!(table = joined, "join without ON equality not modeled");
            return;
        };
        let Some(((left_table, left_column), (right_table, right_column))) = Self::equality(on, query, ctx) else {
            debug!(table = joined, predicate = %on, "join predicate is not a single column equality");
            return;
        };

        let (source, target) = if right_table == joined {
            ((left_table, left_column), (right_table, right_column))
        } else if left_table == joined {
            ((right_table, right_column), (left_table, left_column))
        } else {
            debug!(table = joined, "join predicate does not reference the joined table");
            return;
        };
        if !query.tables.iter().any(|t| t.table_name == source.0) {
            debug!(table = %source.0, "join source is not in FROM");
            return;
        }

        query.joins.push(QueryJoin::new(join_type, &source.0, &source.1, &target.0, &target.1));
    }

    #[allow(clippy::type_complexity)]
    fn equality(expr: &Expr, query: &ParsedQuery, ctx: &TranslationContext) -> Option<((String, String), (String, String))> {
        match expr {
            Expr::Nested(inner) => Self::equality(inner, query, ctx),
            Expr::BinaryOp { left, op: BinaryOperator::Eq, right } => {
                let left = ColumnResolver::resolve(left, query, ctx)?;
                let right = ColumnResolver::resolve(right, query, ctx)?;
                Some((left, right))
            },
            _ => None,
        }
    }
}
