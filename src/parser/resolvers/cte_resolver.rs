use sqlparser::ast::With;
use tracing::debug;

use crate::{
    model::{CommonTableExpression, ParsedQuery},
    parser::{ParseError, ProjectionResolver, QueryTranslator, TranslationContext},
};

/// `WITH` members, parsed before the body so their names are known as
/// pseudo-tables for the rest of the statement.
pub struct CteResolver;

impl CteResolver {
    pub fn resolve(with: &With, query: &mut ParsedQuery, ctx: &mut TranslationContext) -> Result<(), ParseError> {
        if with.recursive {
            debug!("WITH RECURSIVE treated as plain WITH");
        }
        for (index, cte) in with.cte_tables.iter().enumerate() {
            let name = cte.alias.name.value.clone();
            let inner = QueryTranslator::translate_nested(&cte.query, ctx)?;
            let columns = if cte.alias.columns.is_empty() {
                ProjectionResolver::output_columns(&inner)
            } else {
                cte.alias.columns.iter().map(|c| c.value.clone()).collect()
            };
            ctx.add_cte(&name, columns);
            query.ctes.push(CommonTableExpression::new(format!("cte_{}", index), &name, inner));
        }
        Ok(())
    }
}
