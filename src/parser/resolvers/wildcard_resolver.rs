use sqlparser::ast::ObjectName;
use tracing::debug;

use crate::{
    model::{ParsedQuery, SelectedColumns},
    parser::TranslationContext,
};

/// Expands `*` and `table.*` into concrete column selections.
pub struct WildcardResolver;

impl WildcardResolver {
    pub fn expand_all(query: &mut ParsedQuery, ctx: &TranslationContext) {
        for index in 0..query.tables.len() {
            Self::expand(index, query, ctx);
        }
    }

    pub fn expand_table(name: &ObjectName, query: &mut ParsedQuery, ctx: &TranslationContext) {
        let Some(qualifier) = name.0.last() else {
            return;
        };
        let index = ctx.resolve_collection(&qualifier.value)
            .and_then(|table| query.tables.iter().position(|t| t.table_name == table));
        match index {
            Some(index) => Self::expand(index, query, ctx),
            None => debug!(qualifier = %qualifier.value, "wildcard names no table in FROM"),
        }
    }

    /// CTEs and derived tables get the `*` marker; real tables take every
    /// column the schema lists; unknown schemas are left as they are.
    fn expand(index: usize, query: &mut ParsedQuery, ctx: &TranslationContext) {
        let table = &mut query.tables[index];
        if table.is_cte_reference || ctx.is_derived(&table.table_name) {
            table.selected_columns = SelectedColumns::all();
            return;
        }
        match ctx.schemas.columns_of(&table.table_name) {
            Some(columns) => {
                for column in &columns {
                    table.selected_columns.insert(column);
                }
            },
            None => debug!(table = %table.table_name, "schema unknown, wildcard not expanded"),
        }
    }
}
