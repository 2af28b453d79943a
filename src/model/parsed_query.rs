use serde::{Deserialize, Serialize};

use crate::model::{
    ColumnAggregate, CommonTableExpression, GroupByColumn, HavingCondition, OrderByColumn, QueryFilter, QueryJoin,
    QueryLimit, QueryTable, SelectAggregate, Subquery, SubqueryRole,
};

/// Normalized, structurally comparable form of one SELECT.
///
/// Produced fresh by every parse and held (wrapped in a visual state) by the
/// query builder. Subqueries and CTEs own their inner queries, so the tree
/// nests to any depth; filters and having conditions point at their subquery
/// by position in `subqueries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedQuery {
    pub tables: Vec<QueryTable>,
    pub joins: Vec<QueryJoin>,
    pub filters: Vec<QueryFilter>,
    pub group_by: Vec<GroupByColumn>,
    pub having: Vec<HavingCondition>,
    pub order_by: Vec<OrderByColumn>,
    pub limit: Option<QueryLimit>,
    pub offset: Option<u64>,
    pub distinct: bool,
    pub select_aggregates: Vec<SelectAggregate>,
    pub column_aggregates: Vec<ColumnAggregate>,
    pub subqueries: Vec<Subquery>,
    pub ctes: Vec<CommonTableExpression>,
}

impl ParsedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<&QueryTable> {
        self.tables.first()
    }

    /// Table by name or alias, case-insensitive.
    pub fn table(&self, name: &str) -> Option<&QueryTable> {
        self.tables.iter().find(|t| t.answers_to(name))
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut QueryTable> {
        self.tables.iter_mut().find(|t| t.answers_to(name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn cte(&self, name: &str) -> Option<&CommonTableExpression> {
        self.ctes.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The FROM-role subquery registered under `alias`.
    pub fn derived_table(&self, alias: &str) -> Option<&Subquery> {
        self.subqueries.iter().find(|s| {
            s.role == SubqueryRole::From && s.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(alias))
        })
    }

    /// Whether a column aggregate already projects `table.column`.
    pub fn is_aggregated(&self, table: &str, column: &str) -> bool {
        self.column_aggregates.iter().any(|a| a.table_name == table && a.column == column)
    }

    /// Alias of an aggregate or scalar subquery in the SELECT list that
    /// matches `name`. ORDER BY may name these instead of a column.
    pub fn projection_alias(&self, name: &str) -> Option<&str> {
        self.column_aggregates.iter().filter_map(|a| a.alias.as_deref())
            .chain(self.select_aggregates.iter().filter_map(|a| a.alias.as_deref()))
            .chain(self.subqueries.iter()
                .filter(|s| s.role == SubqueryRole::Select)
                .filter_map(|s| s.alias.as_deref()))
            .find(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// Whether some join introduces `table`.
    pub fn is_join_target(&self, table: &str) -> bool {
        self.joins.iter().any(|j| j.target_table == table)
    }

    /// Bring `joins` and `tables` into the order FROM lists them.
    ///
    /// Joins keep their relative order except that a join introducing a
    /// table moves ahead of the joins that use that table as their source.
    /// Tables then follow the FROM clause: the anchor, for each join its
    /// source when nothing else introduces it and then its target, and the
    /// remaining tables last. An order that is already valid is kept.
    pub fn order_for_joins(&mut self) {
        let anchor = self.anchor().map(|t| t.table_name.clone());
        let mut pending = std::mem::take(&mut self.joins);
        while !pending.is_empty() {
            let ordered = &self.joins;
            let ready = pending.iter()
                .position(|join| {
                    let introduces_source = |j: &QueryJoin| j.target_table == join.source_table;
                    anchor.as_deref() == Some(join.source_table.as_str()) ||
                        !pending.iter().any(introduces_source) ||
                        ordered.iter().any(introduces_source)
                })
                .unwrap_or(0);
            self.joins.push(pending.remove(ready));
        }

        if self.tables.len() < 2 {
            return;
        }
        let mut remaining = self.tables.split_off(1);
        for join in &self.joins {
            let source_is_target = self.joins.iter().any(|j| j.target_table == join.source_table);
            let names = [(!source_is_target).then_some(&join.source_table), Some(&join.target_table)];
            for name in names.into_iter().flatten() {
                if let Some(position) = remaining.iter().position(|t| &t.table_name == name) {
                    self.tables.push(remaining.remove(position));
                }
            }
        }
        self.tables.append(&mut remaining);
    }
}
