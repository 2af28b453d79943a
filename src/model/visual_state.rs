use tracing::debug;
use uuid::Uuid;

use crate::format::{validate_identifier, validate_qualified_identifier};
use crate::model::{
    ALL_COLUMNS, ColumnAggregate, CommonTableExpression, GroupByColumn, HavingCondition, OrderByColumn, ParsedQuery, QueryFilter,
    QueryJoin, QueryLimit, QueryTable, SelectAggregate, SelectedColumns, StateError, Subquery, SubqueryRole,
};

/// Editable query owned by one query-builder tab.
///
/// Every mutation validates its identifiers first and leaves the state
/// untouched when it returns an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualQueryState {
    query: ParsedQuery,
}

impl VisualQueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(mut query: ParsedQuery) -> Self {
        query.order_for_joins();
        Self { query }
    }

    pub fn query(&self) -> &ParsedQuery {
        &self.query
    }

    /// Snapshot of the current state as a standalone tree.
    pub fn to_parsed_query(&self) -> ParsedQuery {
        self.query.clone()
    }

    /// Wholesale replacement, used when typed SQL parses to a different tree.
    pub fn replace(&mut self, query: ParsedQuery) {
        self.query = query;
    }

    pub fn clear(&mut self) {
        self.query = ParsedQuery::default();
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(&self.query)?)
    }

    pub fn from_json(text: &str) -> Result<Self, StateError> {
        let mut query: ParsedQuery = serde_json::from_str(text)?;
        query.order_for_joins();
        Ok(Self { query })
    }

    // ---- tables ----

    pub fn add_table(&mut self, name: &str) -> Result<(), StateError> {
        validate_identifier(name)?;
        if self.query.has_table(name) {
            return Err(StateError::DuplicateTable(name.to_string()));
        }
        self.query.tables.push(QueryTable::new(name));
        Ok(())
    }

    /// Place a CTE declared on this query on the canvas.
    pub fn add_cte_reference(&mut self, name: &str) -> Result<(), StateError> {
        let cte_name = match self.query.cte(name) {
            Some(cte) => cte.name.clone(),
            None => return Err(StateError::UnknownTable(name.to_string())),
        };
        if self.query.has_table(&cte_name) {
            return Err(StateError::DuplicateTable(cte_name));
        }
        let mut table = QueryTable::cte_reference(&cte_name);
        table.selected_columns = SelectedColumns::all();
        self.query.tables.push(table);
        Ok(())
    }

    /// Remove a table and everything that refers to it.
    pub fn remove_table(&mut self, name: &str) -> Result<(), StateError> {
        let position = self.query.tables.iter().position(|t| t.answers_to(name))
            .ok_or_else(|| StateError::UnknownTable(name.to_string()))?;
        let removed = self.query.tables.remove(position);
        let table = removed.table_name.as_str();
        let refers = |column: &str| column.split_once('.').is_some_and(|(t, _)| t == table);

        self.query.joins.retain(|j| !j.involves(table));
        self.query.order_for_joins();

        for index in (0..self.query.filters.len()).rev() {
            if refers(&self.query.filters[index].column) {
                self.remove_filter(index)?;
            }
        }
        for index in (0..self.query.having.len()).rev() {
            if refers(&self.query.having[index].column) {
                self.remove_having(index)?;
            }
        }
        self.query.group_by.retain(|g| !refers(&g.column));
        self.query.order_by.retain(|o| !refers(&o.column));
        self.query.column_aggregates.retain(|a| a.table_name != table);

        if let Some(index) = self.query.subqueries.iter().position(|s| {
            s.role == SubqueryRole::From && s.alias.as_deref() == Some(table)
        }) {
            self.remove_subquery(index);
        }

        debug!(table, "removed table and its references");
        Ok(())
    }

    /// Flip one column of a table in or out of the SELECT list.
    /// Returns whether the column is now selected.
    pub fn toggle_column(&mut self, table: &str, column: &str) -> Result<bool, StateError> {
        validate_identifier(column)?;
        let entry = self.query.table_mut(table)
            .ok_or_else(|| StateError::UnknownTable(table.to_string()))?;
        Ok(entry.selected_columns.toggle(column))
    }

    /// Replace a table's selection wholesale.
    pub fn select_columns<S: AsRef<str>>(&mut self, table: &str, columns: &[S]) -> Result<(), StateError> {
        for column in columns {
            let column = column.as_ref();
            if column != ALL_COLUMNS {
                validate_identifier(column)?;
            }
        }
        let entry = self.query.table_mut(table)
            .ok_or_else(|| StateError::UnknownTable(table.to_string()))?;
        entry.selected_columns.clear();
        for column in columns {
            entry.selected_columns.insert(column.as_ref());
        }
        Ok(())
    }

    // ---- joins ----

    /// Add an equality join. Table names may be aliases; the join is stored
    /// under the tables' names. A join pointing back at the anchor table is
    /// flipped so the relation it introduces is never the FROM anchor.
    /// Tables are reordered so the new target follows its source.
    pub fn add_join(&mut self, join: QueryJoin) -> Result<usize, StateError> {
        validate_identifier(&join.source_column)?;
        validate_identifier(&join.target_column)?;
        let source = self.table_name_of(&join.source_table)?;
        let target = self.table_name_of(&join.target_table)?;
        let targets_anchor = self.query.anchor().is_some_and(|a| a.table_name == target);
        let join = if targets_anchor && source != target {
            QueryJoin::new(join.join_type, &target, &join.target_column, &source, &join.source_column)
        } else {
            QueryJoin::new(join.join_type, &source, &join.source_column, &target, &join.target_column)
        };
        if self.joined_from(&join.source_table, &join.target_table) {
            return Err(StateError::CyclicJoin { source: join.source_table, target: join.target_table });
        }
        self.query.joins.push(join.clone());
        self.query.order_for_joins();
        let position = self.query.joins.iter().rposition(|j| j == &join);
        Ok(position.unwrap_or(self.query.joins.len() - 1))
    }

    pub fn remove_join(&mut self, index: usize) -> Result<QueryJoin, StateError> {
        if index >= self.query.joins.len() {
            return Err(StateError::out_of_range("join", index, self.query.joins.len()));
        }
        let removed = self.query.joins.remove(index);
        self.query.order_for_joins();
        Ok(removed)
    }

    // ---- filters ----

    pub fn add_filter(&mut self, filter: QueryFilter) -> Result<usize, StateError> {
        let column = self.canonical_column(&filter.column)?;
        self.query.filters.push(QueryFilter { column, subquery_index: None, ..filter });
        Ok(self.query.filters.len() - 1)
    }

    /// Replace a filter's column, operator, value and connector. An attached
    /// subquery survives only while the new operator can still take one.
    pub fn update_filter(&mut self, index: usize, filter: QueryFilter) -> Result<(), StateError> {
        let filter = QueryFilter { column: self.canonical_column(&filter.column)?, ..filter };
        let len = self.query.filters.len();
        let current = self.query.filters.get(index)
            .ok_or_else(|| StateError::out_of_range("filter", index, len))?;
        let subquery_index = current.subquery_index;

        match subquery_index {
            Some(sub) if filter.operator.accepts_subquery() => {
                self.query.filters[index] = QueryFilter { value: String::new(), subquery_index: Some(sub), ..filter };
            },
            Some(sub) => {
                self.query.filters[index] = QueryFilter { subquery_index: None, ..filter };
                self.remove_subquery(sub);
            },
            None => {
                self.query.filters[index] = QueryFilter { subquery_index: None, ..filter };
            },
        }
        Ok(())
    }

    /// Remove a filter together with its subquery; later filters and their
    /// subquery links shift down.
    pub fn remove_filter(&mut self, index: usize) -> Result<QueryFilter, StateError> {
        if index >= self.query.filters.len() {
            return Err(StateError::out_of_range("filter", index, self.query.filters.len()));
        }
        let removed = self.query.filters.remove(index);
        for sub in self.query.subqueries.iter_mut() {
            match sub.linked_filter_index {
                Some(linked) if linked > index => sub.linked_filter_index = Some(linked - 1),
                _ => {},
            }
        }
        if let Some(sub) = removed.subquery_index {
            self.remove_subquery(sub);
        }
        Ok(removed)
    }

    /// Make `inner` the right-hand side of `filters[filter_index]`, replacing
    /// any subquery already attached there. Returns the subquery's index.
    pub fn attach_subquery(&mut self, filter_index: usize, inner: ParsedQuery) -> Result<usize, StateError> {
        let len = self.query.filters.len();
        let filter = self.query.filters.get(filter_index)
            .ok_or_else(|| StateError::out_of_range("filter", filter_index, len))?;
        if !filter.operator.accepts_subquery() {
            return Err(StateError::SubqueryNotAllowed(filter.operator));
        }

        if let Some(existing) = filter.subquery_index {
            match self.query.subqueries.get_mut(existing) {
                Some(subquery) => {
                    subquery.inner_query = Box::new(inner);
                    return Ok(existing);
                },
                None => debug!(filter_index, existing, "dangling subquery link replaced"),
            }
        }

        let subquery = Subquery::new(Uuid::new_v4().to_string(), SubqueryRole::Where, inner).linked_to(filter_index);
        self.query.subqueries.push(subquery);
        let filter = &mut self.query.filters[filter_index];
        filter.subquery_index = Some(self.query.subqueries.len() - 1);
        filter.value.clear();
        self.reorder_subqueries();
        Ok(self.query.filters[filter_index].subquery_index.unwrap_or_default())
    }

    // ---- grouping, ordering, paging ----

    pub fn add_group_by(&mut self, column: &str) -> Result<(), StateError> {
        let column = self.canonical_column(column)?;
        if !self.query.group_by.iter().any(|g| g.column == column) {
            self.query.group_by.push(GroupByColumn::new(&column));
        }
        Ok(())
    }

    pub fn add_having(&mut self, condition: HavingCondition) -> Result<usize, StateError> {
        let column = match condition.column.as_str() {
            ALL_COLUMNS => condition.column.clone(),
            other => self.canonical_column(other)?,
        };
        self.query.having.push(HavingCondition { column, subquery_index: None, ..condition });
        Ok(self.query.having.len() - 1)
    }

    pub fn remove_having(&mut self, index: usize) -> Result<HavingCondition, StateError> {
        if index >= self.query.having.len() {
            return Err(StateError::out_of_range("having", index, self.query.having.len()));
        }
        let removed = self.query.having.remove(index);
        if let Some(sub) = removed.subquery_index {
            self.remove_subquery(sub);
        }
        Ok(removed)
    }

    /// Sort by a column, or by the alias of an aggregate or scalar subquery
    /// in the SELECT list.
    pub fn add_order_by(&mut self, order: OrderByColumn) -> Result<(), StateError> {
        let column = match self.query.projection_alias(&order.column) {
            Some(alias) => alias.to_string(),
            None => self.canonical_column(&order.column)?,
        };
        self.query.order_by.retain(|o| o.column != column);
        self.query.order_by.push(OrderByColumn { column, ..order });
        Ok(())
    }

    pub fn set_limit(&mut self, limit: Option<QueryLimit>) {
        self.query.limit = limit;
    }

    pub fn set_offset(&mut self, offset: Option<u64>) {
        self.query.offset = offset;
    }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.query.distinct = distinct;
    }

    // ---- aggregates ----

    /// Add `FUNC(table.column)`; the column is selected as well, which is
    /// how a parsed query records the same projection.
    pub fn add_column_aggregate(&mut self, aggregate: ColumnAggregate) -> Result<(), StateError> {
        validate_identifier(&aggregate.column)?;
        if let Some(alias) = &aggregate.alias {
            validate_identifier(alias)?;
        }
        let table = self.query.table_mut(&aggregate.table_name)
            .ok_or_else(|| StateError::UnknownTable(aggregate.table_name.clone()))?;
        table.selected_columns.insert(&aggregate.column);
        let table_name = table.table_name.clone();
        self.query.column_aggregates.push(ColumnAggregate { table_name, ..aggregate });
        Ok(())
    }

    pub fn add_select_aggregate(&mut self, aggregate: SelectAggregate) -> Result<(), StateError> {
        if let Some(alias) = &aggregate.alias {
            validate_identifier(alias)?;
        }
        self.query.select_aggregates.push(SelectAggregate { expression: "*".to_string(), ..aggregate });
        Ok(())
    }

    // ---- CTEs ----

    /// Declare `WITH name AS (inner)`. The CTE still has to be placed on the
    /// canvas with [`add_cte_reference`](Self::add_cte_reference).
    pub fn add_cte(&mut self, name: &str, inner: ParsedQuery) -> Result<(), StateError> {
        validate_identifier(name)?;
        if self.query.cte(name).is_some() {
            return Err(StateError::DuplicateCte(name.to_string()));
        }
        self.query.ctes.push(CommonTableExpression::new(Uuid::new_v4().to_string(), name, inner));
        Ok(())
    }

    /// `table.column` with the qualifier resolved to the table's name, since
    /// generated SQL never declares aliases. A bare column belongs to the
    /// anchor, as it does when unqualified SQL is parsed without a schema.
    fn canonical_column(&self, column: &str) -> Result<String, StateError> {
        validate_qualified_identifier(column)?;
        match column.split_once('.') {
            Some((table, name)) => Ok(format!("{}.{}", self.table_name_of(table)?, name)),
            None => match self.query.anchor() {
                Some(anchor) => Ok(format!("{}.{}", anchor.table_name, column)),
                None => Err(StateError::NoTableForColumn(column.to_string())),
            },
        }
    }

    fn table_name_of(&self, name: &str) -> Result<String, StateError> {
        self.query.table(name)
            .map(|t| t.table_name.clone())
            .ok_or_else(|| StateError::UnknownTable(name.to_string()))
    }

    /// Whether following joins back from `table` towards the anchor passes
    /// through `other`.
    fn joined_from(&self, table: &str, other: &str) -> bool {
        let mut current = table;
        for _ in 0..=self.query.joins.len() {
            if current == other {
                return true;
            }
            match self.query.joins.iter().find(|j| j.target_table == current) {
                Some(join) => current = &join.source_table,
                None => return false,
            }
        }
        false
    }

    /// Keep `subqueries` in the order the generated SQL lists them: FROM,
    /// then SELECT, then WHERE in filter order, then HAVING in condition
    /// order. Parsing the generated text yields the same positions.
    fn reorder_subqueries(&mut self) {
        let query = &self.query;
        let mut order: Vec<usize> = Vec::with_capacity(query.subqueries.len());
        for role in [SubqueryRole::From, SubqueryRole::Select] {
            order.extend(query.subqueries.iter().enumerate()
                .filter(|(_, s)| s.role == role)
                .map(|(i, _)| i));
        }
        let linked = query.filters.iter().filter_map(|f| f.subquery_index)
            .chain(query.having.iter().filter_map(|h| h.subquery_index))
            .chain(0..query.subqueries.len());
        for i in linked {
            if i < query.subqueries.len() && !order.contains(&i) {
                order.push(i);
            }
        }
        if order.iter().enumerate().all(|(position, &i)| position == i) {
            return;
        }

        let mut slots: Vec<Option<Subquery>> = std::mem::take(&mut self.query.subqueries).into_iter().map(Some).collect();
        let mut remap = vec![0usize; slots.len()];
        for (position, &old) in order.iter().enumerate() {
            remap[old] = position;
            if let Some(subquery) = slots[old].take() {
                self.query.subqueries.push(subquery);
            }
        }
        let apply = |slot: &mut Option<usize>| {
            if let Some(i) = *slot {
                *slot = remap.get(i).copied();
            }
        };
        self.query.filters.iter_mut().for_each(|f| apply(&mut f.subquery_index));
        self.query.having.iter_mut().for_each(|h| apply(&mut h.subquery_index));
    }

    /// Drop `subqueries[index]` and shift every index pointing past it.
    fn remove_subquery(&mut self, index: usize) {
        if index >= self.query.subqueries.len() {
            return;
        }
        self.query.subqueries.remove(index);
        let shift = |slot: &mut Option<usize>| match *slot {
            Some(i) if i == index => *slot = None,
            Some(i) if i > index => *slot = Some(i - 1),
            _ => {},
        };
        self.query.filters.iter_mut().for_each(|f| shift(&mut f.subquery_index));
        self.query.having.iter_mut().for_each(|h| shift(&mut h.subquery_index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AggregateFunction, Connector, FilterOperator, HavingOperator, JoinType};

    fn orders_and_customers() -> VisualQueryState {
        let mut state = VisualQueryState::new();
        state.add_table("orders").expect("Failed to add orders");
        state.add_table("customers").expect("Failed to add customers");
        state
    }

    #[test]
    fn test_add_table_rejects_bad_and_duplicate_names() {
        let mut state = VisualQueryState::new();
        state.add_table("orders").unwrap();
        assert!(matches!(state.add_table("orders"), Err(StateError::DuplicateTable(_))));
        assert!(matches!(state.add_table("x; DROP"), Err(StateError::InvalidIdentifier(_))));
        assert_eq!(state.query().tables.len(), 1);
    }

    #[test]
    fn test_toggle_column() {
        let mut state = orders_and_customers();
        assert!(state.toggle_column("orders", "id").unwrap());
        assert!(state.query().tables[0].selected_columns.contains("id"));
        assert!(!state.toggle_column("orders", "id").unwrap());
        assert!(matches!(state.toggle_column("ghost", "id"), Err(StateError::UnknownTable(_))));
    }

    #[test]
    fn test_join_requires_both_tables() {
        let mut state = orders_and_customers();
        let join = QueryJoin::inner("orders", "customer_id", "customers", "id");
        assert_eq!(state.add_join(join).unwrap(), 0);
        let bad = QueryJoin::new(JoinType::Left, "orders", "id", "ghost", "order_id");
        assert!(matches!(state.add_join(bad), Err(StateError::UnknownTable(t)) if t == "ghost"));
    }

    #[test]
    fn test_remove_table_cascades() {
        let mut state = orders_and_customers();
        state.add_join(QueryJoin::inner("orders", "customer_id", "customers", "id")).unwrap();
        state.add_filter(QueryFilter::new("customers.country", FilterOperator::Eq, "USA")).unwrap();
        state.add_filter(QueryFilter::new("orders.total", FilterOperator::Gt, "10")).unwrap();
        state.add_group_by("customers.country").unwrap();
        state.add_column_aggregate(ColumnAggregate::new(AggregateFunction::Sum, "orders", "total", None)).unwrap();

        state.remove_table("customers").unwrap();

        let query = state.query();
        assert_eq!(query.tables.len(), 1);
        assert!(query.joins.is_empty());
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].column, "orders.total");
        assert!(query.group_by.is_empty());
        assert_eq!(query.column_aggregates.len(), 1);
    }

    #[test]
    fn test_remove_filter_reindexes_subqueries() {
        let mut state = orders_and_customers();
        state.add_filter(QueryFilter::new("orders.customer_id", FilterOperator::In, "")).unwrap();
        state.add_filter(QueryFilter::new("orders.product_id", FilterOperator::In, "").with_connector(Connector::Or)).unwrap();

        let mut first = ParsedQuery::new();
        first.tables.push(QueryTable::new("customers"));
        let mut second = ParsedQuery::new();
        second.tables.push(QueryTable::new("products"));
        assert_eq!(state.attach_subquery(0, first).unwrap(), 0);
        assert_eq!(state.attach_subquery(1, second).unwrap(), 1);

        state.remove_filter(0).unwrap();

        let query = state.query();
        assert_eq!(query.subqueries.len(), 1);
        assert_eq!(query.filters[0].subquery_index, Some(0));
        assert_eq!(query.subqueries[0].linked_filter_index, Some(0));
        assert_eq!(query.subqueries[0].inner_query.tables[0].table_name, "products");
    }

    #[test]
    fn test_attach_subquery_requires_compatible_operator() {
        let mut state = orders_and_customers();
        state.add_filter(QueryFilter::new("orders.note", FilterOperator::Like, "x%")).unwrap();
        let result = state.attach_subquery(0, ParsedQuery::new());
        assert!(matches!(result, Err(StateError::SubqueryNotAllowed(FilterOperator::Like))));
        assert!(state.query().subqueries.is_empty());
    }

    #[test]
    fn test_update_filter_drops_subquery_on_incompatible_operator() {
        let mut state = orders_and_customers();
        state.add_filter(QueryFilter::new("orders.customer_id", FilterOperator::In, "")).unwrap();
        state.attach_subquery(0, ParsedQuery::new()).unwrap();
        state.update_filter(0, QueryFilter::new("orders.customer_id", FilterOperator::IsNull, "")).unwrap();
        assert!(state.query().subqueries.is_empty());
        assert_eq!(state.query().filters[0].subquery_index, None);
    }

    #[test]
    fn test_cte_reference_must_be_declared() {
        let mut state = VisualQueryState::new();
        assert!(matches!(state.add_cte_reference("recent"), Err(StateError::UnknownTable(_))));
        state.add_cte("recent", ParsedQuery::new()).unwrap();
        assert!(matches!(state.add_cte("recent", ParsedQuery::new()), Err(StateError::DuplicateCte(_))));
        state.add_cte_reference("recent").unwrap();
        assert!(state.query().tables[0].is_cte_reference);
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = orders_and_customers();
        state.select_columns("orders", &["id", "total"]).unwrap();
        state.set_limit(Some(QueryLimit::Count(10)));
        let json = state.to_json().unwrap();
        let back = VisualQueryState::from_json(&json).expect("Failed to restore state");
        assert_eq!(back, state);
    }

    #[test]
    fn test_alias_qualifiers_are_stored_as_table_names() {
        let mut query = ParsedQuery::new();
        query.tables.push(QueryTable::new("orders").with_alias("o").with_columns(&["id"]));
        query.tables.push(QueryTable::new("customers").with_alias("c"));
        let mut state = VisualQueryState::from_query(query);

        state.add_filter(QueryFilter::new("o.total", FilterOperator::Gt, "5")).unwrap();
        state.update_filter(0, QueryFilter::new("O.total", FilterOperator::GtEq, "6")).unwrap();
        state.add_join(QueryJoin::inner("o", "customer_id", "c", "id")).unwrap();
        state.add_group_by("c.country").unwrap();
        state.add_having(HavingCondition::new(AggregateFunction::Sum, "o.total", HavingOperator::Gt, "1")).unwrap();
        state.add_order_by(OrderByColumn::asc("c.name")).unwrap();
        state.add_column_aggregate(ColumnAggregate::new(AggregateFunction::Max, "o", "total", None)).unwrap();

        let query = state.query();
        assert_eq!(query.filters[0].column, "orders.total");
        assert_eq!((query.joins[0].source_table.as_str(), query.joins[0].target_table.as_str()), ("orders", "customers"));
        assert_eq!(query.group_by[0].column, "customers.country");
        assert_eq!(query.having[0].column, "orders.total");
        assert_eq!(query.order_by[0].column, "customers.name");
        assert_eq!(query.column_aggregates[0].table_name, "orders");
    }

    #[test]
    fn test_bare_columns_belong_to_the_anchor() {
        let mut state = VisualQueryState::new();
        let err = state.add_filter(QueryFilter::new("id", FilterOperator::Eq, "1")).unwrap_err();
        assert!(matches!(err, StateError::NoTableForColumn(c) if c == "id"));

        state.add_table("orders").unwrap();
        state.add_table("customers").unwrap();
        state.add_filter(QueryFilter::new("id", FilterOperator::Eq, "1")).unwrap();
        state.add_group_by("status").unwrap();
        assert_eq!(state.query().filters[0].column, "orders.id");
        assert_eq!(state.query().group_by[0].column, "orders.status");
    }

    #[test]
    fn test_order_by_keeps_projection_alias() {
        let mut state = orders_and_customers();
        state.add_column_aggregate(ColumnAggregate::new(AggregateFunction::Sum, "orders", "total", Some("revenue"))).unwrap();
        state.add_order_by(OrderByColumn::desc("revenue")).unwrap();
        state.add_order_by(OrderByColumn::asc("total")).unwrap();
        let columns: Vec<&str> = state.query().order_by.iter().map(|o| o.column.as_str()).collect();
        assert_eq!(columns, vec!["revenue", "orders.total"]);
    }

    #[test]
    fn test_join_reorders_tables_and_rejects_cycles() {
        let mut state = VisualQueryState::new();
        for table in ["orders", "regions", "customers"] {
            state.add_table(table).unwrap();
        }
        assert_eq!(state.add_join(QueryJoin::inner("customers", "region_id", "regions", "id")).unwrap(), 0);
        let names: Vec<&str> = state.query().tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["orders", "customers", "regions"]);

        let cycle = QueryJoin::inner("regions", "id", "customers", "region_id");
        assert!(matches!(state.add_join(cycle), Err(StateError::CyclicJoin { .. })));
        let own = QueryJoin::inner("regions", "id", "regions", "parent_id");
        assert!(matches!(state.add_join(own), Err(StateError::CyclicJoin { .. })));
        assert_eq!(state.query().joins.len(), 1);
    }

    #[test]
    fn test_attach_subquery_over_dangling_link() {
        let json = r#"{
            "tables": [{"tableName": "orders"}],
            "filters": [{"column": "orders.customer_id", "operator": "IN", "value": "", "subqueryIndex": 3}]
        }"#;
        let mut state = VisualQueryState::from_json(json).expect("Failed to restore state");
        let mut inner = ParsedQuery::new();
        inner.tables.push(QueryTable::new("customers"));

        assert_eq!(state.attach_subquery(0, inner).unwrap(), 0);
        let query = state.query();
        assert_eq!(query.subqueries.len(), 1);
        assert_eq!(query.filters[0].subquery_index, Some(0));
        assert_eq!(query.subqueries[0].inner_query.tables[0].table_name, "customers");
    }
}
