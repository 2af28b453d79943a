use sqlparser::ast::{TableFactor, TableWithJoins};
use tracing::debug;

use crate::{
    model::{ParsedQuery, QueryTable, Subquery, SubqueryRole},
    parser::{JoinResolver, ParseError, ProjectionResolver, QueryTranslator, TranslationContext},
};

/// FROM clause: tables, CTE references, derived tables and their joins.
pub struct TableResolver;

impl TableResolver {
    pub fn resolve_from(from: &[TableWithJoins], query: &mut ParsedQuery, ctx: &mut TranslationContext) -> Result<(), ParseError> {
        for item in from {
            Self::add_relation(&item.relation, query, ctx)?;
            for join in &item.joins {
                match Self::add_relation(&join.relation, query, ctx)? {
                    Some(joined) => JoinResolver::resolve(join, &joined, query, ctx),
                    None => debug!("join dropped with its table"),
                }
            }
        }
        Ok(())
    }

    /// Register one relation; returns the name it is known by in `tables`,
    /// or `None` when it was dropped.
    fn add_relation(factor: &TableFactor, query: &mut ParsedQuery, ctx: &mut TranslationContext) -> Result<Option<String>, ParseError> {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                let Some(ident) = name.0.last() else {
                    return Ok(None);
                };
                let table_name = ident.value.clone();
                let alias = alias.as_ref().map(|a| a.name.value.clone());

                let mut table = if ctx.is_cte(&table_name) {
                    QueryTable::cte_reference(&table_name)
                } else if ctx.accepts_table(&table_name) {
                    QueryTable::new(&table_name)
                } else {
                    debug!(table = %table_name, "table not in the allowed list, omitted");
                    return Ok(None);
                };
                table.alias = alias.clone();

                ctx.add_collection(&table_name, alias.as_deref());
                query.tables.push(table);
                Ok(Some(table_name))
            },
            TableFactor::Derived { subquery, alias, .. } => {
                let alias_name = alias.as_ref()
                    .map(|a| a.name.value.clone())
                    .unwrap_or_else(|| format!("derived_{}", query.subqueries.len()));
                let inner = QueryTranslator::translate_nested(subquery, ctx)?;
                let columns = match alias.as_ref().filter(|a| !a.columns.is_empty()) {
                    Some(alias) => alias.columns.iter().map(|c| c.value.clone()).collect(),
                    None => ProjectionResolver::output_columns(&inner),
                };

                ctx.add_derived(&alias_name, columns);
                ctx.add_collection(&alias_name, None);
                let index = query.subqueries.len();
                query.subqueries.push(
                    Subquery::new(format!("subquery_{}", index), SubqueryRole::From, inner).with_alias(&alias_name)
                );
                query.tables.push(QueryTable::new(&alias_name));
                Ok(Some(alias_name))
            },
            TableFactor::NestedJoin { table_with_joins, .. } => {
                let before = query.tables.len();
                Self::resolve_from(std::slice::from_ref(table_with_joins.as_ref()), query, ctx)?;
                Ok(query.tables.get(before).map(|t| t.table_name.clone()))
            },
            other => {
                debug!(relation = %other, "FROM item not modeled");
                Ok(None)
            },
        }
    }
}
