use tracing::trace;

use crate::{
    builder::{comparison_value, indent, with_alias},
    format::{qualified_name, quote_column_ref, quote_identifier, quote_string},
    model::{ALL_COLUMNS, FilterOperator, HavingCondition, ParsedQuery, QueryFilter, QueryJoin, QueryTable, SubqueryRole},
};

/// Deterministic SQL text for a query model.
///
/// The same model always yields byte-identical text, and parsing that text
/// back yields an equivalent model; the sync layer relies on both to decide
/// when typed SQL can be left alone.
pub struct SqlBuilder;

impl SqlBuilder {
    /// Empty string for an empty canvas.
    pub fn generate(query: &ParsedQuery) -> String {
        let sql = Self::render(query, &[]);
        trace!(sql = %sql, "generated SQL");
        sql
    }

    /// `outer` lists the tables of enclosing queries, so correlated column
    /// references in values are emitted as columns rather than strings.
    fn render(query: &ParsedQuery, outer: &[&str]) -> String {
        let Some(anchor) = query.anchor() else {
            return String::new();
        };
        let scope: Vec<&str> = outer.iter().copied()
            .chain(query.tables.iter().map(|t| t.table_name.as_str()))
            .collect();

        let mut clauses: Vec<String> = Vec::new();
        if let Some(with) = Self::with_clause(query) {
            clauses.push(with);
        }
        clauses.push(Self::select_clause(query, anchor, &scope));
        clauses.push(Self::from_clause(query, anchor, outer));
        if !query.filters.is_empty() {
            let filters: Vec<String> = query.filters.iter().map(|f| Self::filter_sql(f, query, &scope)).collect();
            clauses.push(Self::chain("WHERE", query.filters.iter().map(|f| f.connector.as_sql()), filters));
        }
        if !query.group_by.is_empty() {
            let columns: Vec<String> = query.group_by.iter().map(|g| quote_column_ref(&g.column)).collect();
            clauses.push(format!("GROUP BY {}", columns.join(", ")));
        }
        if !query.having.is_empty() {
            let conditions: Vec<String> = query.having.iter().map(|h| Self::having_sql(h, query, &scope)).collect();
            clauses.push(Self::chain("HAVING", query.having.iter().map(|h| h.connector.as_sql()), conditions));
        }
        if !query.order_by.is_empty() {
            let columns: Vec<String> = query.order_by.iter()
                .map(|o| format!("{} {}", quote_column_ref(&o.column), o.direction))
                .collect();
            clauses.push(format!("ORDER BY {}", columns.join(", ")));
        }
        if let Some(limit) = &query.limit {
            clauses.push(format!("LIMIT {}", limit));
        }
        if let Some(offset) = query.offset {
            clauses.push(format!("OFFSET {}", offset));
        }
        clauses.join("\n")
    }

    fn with_clause(query: &ParsedQuery) -> Option<String> {
        let members: Vec<String> = query.ctes.iter()
            .filter_map(|cte| {
                let body = Self::render(&cte.inner_query, &[]);
                if body.is_empty() {
                    return None;
                }
                Some(format!("{} AS (\n{}\n)", quote_identifier(&cte.name), indent(&body, 2)))
            })
            .collect();
        if members.is_empty() {
            return None;
        }
        Some(format!("WITH {}", members.join(", ")))
    }

    fn select_clause(query: &ParsedQuery, anchor: &QueryTable, scope: &[&str]) -> String {
        let mut items: Vec<String> = Vec::new();
        for table in &query.tables {
            if table.selected_columns.is_all() {
                items.push(format!("{}.*", quote_identifier(&table.table_name)));
                continue;
            }
            for column in &table.selected_columns {
                if column == ALL_COLUMNS || query.is_aggregated(&table.table_name, column) {
                    continue;
                }
                items.push(qualified_name(&table.table_name, column));
            }
        }
        for aggregate in &query.column_aggregates {
            let call = format!("{}({})", aggregate.function, qualified_name(&aggregate.table_name, &aggregate.column));
            items.push(with_alias(call, aggregate.alias.as_deref()));
        }
        for aggregate in &query.select_aggregates {
            items.push(with_alias(format!("{}(*)", aggregate.function), aggregate.alias.as_deref()));
        }
        for subquery in query.subqueries.iter().filter(|s| s.role == SubqueryRole::Select) {
            let body = Self::render(&subquery.inner_query, scope);
            if body.is_empty() {
                continue;
            }
            items.push(with_alias(format!("(\n{}\n  )", indent(&body, 4)), subquery.alias.as_deref()));
        }
        if items.is_empty() {
            items.push(format!("{}.*", quote_identifier(&anchor.table_name)));
        }

        let distinct = if query.distinct { "DISTINCT " } else { "" };
        format!("SELECT {}{}", distinct, items.join(", "))
    }

    /// Anchor, then the joins in stored order. A join source that no join
    /// introduces is cross joined right before its first join; tables left
    /// over are cross joined at the end.
    fn from_clause(query: &ParsedQuery, anchor: &QueryTable, outer: &[&str]) -> String {
        let mut from = format!("FROM {}", Self::relation(anchor, query, outer));
        let mut placed: Vec<&str> = vec![anchor.table_name.as_str()];
        let find = |name: &str| query.tables.iter().find(|t| t.table_name == name);

        for join in &query.joins {
            let source = join.source_table.as_str();
            if !placed.contains(&source) && !query.is_join_target(source) {
                if let Some(table) = find(source) {
                    from.push_str(&format!("\n  CROSS JOIN {}", Self::relation(table, query, outer)));
                    placed.push(source);
                }
            }
            let relation = match find(join.target_table.as_str()) {
                Some(table) => Self::relation(table, query, outer),
                None => quote_identifier(&join.target_table),
            };
            from.push_str(&Self::join_sql(join, &relation));
            placed.push(join.target_table.as_str());
        }
        for table in query.tables.iter().skip(1).filter(|t| !placed.contains(&t.table_name.as_str())) {
            from.push_str(&format!("\n  CROSS JOIN {}", Self::relation(table, query, outer)));
        }
        from
    }

    fn join_sql(join: &QueryJoin, relation: &str) -> String {
        format!(
            "\n  {} JOIN {} ON {} = {}",
            join.join_type,
            relation,
            qualified_name(&join.source_table, &join.source_column),
            qualified_name(&join.target_table, &join.target_column),
        )
    }

    /// A table name, or `(...) AS alias` for a derived table.
    fn relation(table: &QueryTable, query: &ParsedQuery, outer: &[&str]) -> String {
        if !table.is_cte_reference {
            if let Some(derived) = query.derived_table(&table.table_name) {
                let body = Self::render(&derived.inner_query, outer);
                if !body.is_empty() {
                    return format!("(\n{}\n) AS {}", indent(&body, 2), quote_identifier(&table.table_name));
                }
            }
        }
        quote_identifier(&table.table_name)
    }

    /// `KEYWORD first\n  CONNECTOR second ...`; each condition is preceded by
    /// its own connector, the first one's is never written.
    fn chain<'c>(keyword: &str, connectors: impl Iterator<Item = &'c str>, conditions: Vec<String>) -> String {
        let mut clause = format!("{} ", keyword);
        for (index, (connector, condition)) in connectors.zip(conditions).enumerate() {
            if index > 0 {
                clause.push_str("\n  ");
                clause.push_str(connector);
                clause.push(' ');
            }
            clause.push_str(&condition);
        }
        clause
    }

    fn filter_sql(filter: &QueryFilter, query: &ParsedQuery, scope: &[&str]) -> String {
        let column = quote_column_ref(&filter.column);
        let operator = filter.operator;
        if let Some(subquery) = nested_at(query, filter.subquery_index) {
            return format!("{} {} (\n{}\n  )", column, operator, indent(&Self::render(subquery, scope), 4));
        }
        match operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => format!("{} {}", column, operator),
            FilterOperator::In | FilterOperator::NotIn => format!("{} {} ({})", column, operator, filter.value.trim()),
            FilterOperator::Between => format!("{} {} {}", column, operator, filter.value.trim()),
            FilterOperator::Like | FilterOperator::NotLike => format!("{} {} {}", column, operator, quote_string(&filter.value)),
            _ => format!("{} {} {}", column, operator, comparison_value(&filter.value, scope)),
        }
    }

    fn having_sql(condition: &HavingCondition, query: &ParsedQuery, scope: &[&str]) -> String {
        let argument = if condition.column == ALL_COLUMNS {
            ALL_COLUMNS.to_string()
        } else {
            quote_column_ref(&condition.column)
        };
        let lhs = format!("{}({})", condition.aggregate_function, argument);
        if let Some(subquery) = nested_at(query, condition.subquery_index) {
            return format!("{} {} (\n{}\n  )", lhs, condition.operator, indent(&Self::render(subquery, scope), 4));
        }
        format!("{} {} {}", lhs, condition.operator, comparison_value(&condition.value, scope))
    }
}

/// Inner query behind a filter's `subquery_index`, skipping empty ones
/// which have no SQL of their own.
fn nested_at(query: &ParsedQuery, index: Option<usize>) -> Option<&ParsedQuery> {
    let subquery = query.subqueries.get(index?)?;
    (!subquery.inner_query.tables.is_empty()).then_some(subquery.inner_query.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AggregateFunction, ColumnAggregate, Connector, HavingOperator, OrderByColumn, QueryJoin, QueryLimit,
        SelectAggregate, Subquery, VisualQueryState,
    };
    use pretty_assertions::assert_eq;

    fn orders() -> VisualQueryState {
        let mut state = VisualQueryState::new();
        state.add_table("orders").expect("Failed to add table");
        state
    }

    #[test]
    fn test_empty_canvas_generates_nothing() {
        assert_eq!(SqlBuilder::generate(&ParsedQuery::default()), "");
    }

    #[test]
    fn test_no_columns_falls_back_to_anchor_star() {
        assert_eq!(SqlBuilder::generate(orders().query()), "SELECT orders.*\nFROM orders");
    }

    #[test]
    fn test_connector_precedes_its_own_filter() {
        let mut state = orders();
        state.add_filter(QueryFilter::new("a", FilterOperator::Eq, "1").with_connector(Connector::And)).unwrap();
        state.add_filter(QueryFilter::new("b", FilterOperator::Eq, "2").with_connector(Connector::Or)).unwrap();
        let sql = SqlBuilder::generate(state.query());
        assert!(sql.ends_with("WHERE orders.a = 1\n  OR orders.b = 2"), "{}", sql);
    }

    #[test]
    fn test_numeric_and_quoted_values() {
        let mut state = orders();
        state.add_filter(QueryFilter::new("orders.total", FilterOperator::Eq, "42")).unwrap();
        state.add_filter(QueryFilter::new("orders.status", FilterOperator::Eq, "abc")).unwrap();
        let sql = SqlBuilder::generate(state.query());
        assert!(sql.contains("orders.total = 42"));
        assert!(sql.contains("orders.status = 'abc'"));
    }

    #[test]
    fn test_operator_formatting() {
        let mut state = orders();
        state.add_filter(QueryFilter::new("orders.note", FilterOperator::IsNull, "ignored")).unwrap();
        state.add_filter(QueryFilter::new("orders.id", FilterOperator::In, "1, 2, 3")).unwrap();
        state.add_filter(QueryFilter::new("orders.total", FilterOperator::Between, "10 AND 20")).unwrap();
        state.add_filter(QueryFilter::new("orders.status", FilterOperator::Like, "5%")).unwrap();
        let sql = SqlBuilder::generate(state.query());
        assert_eq!(sql, "SELECT orders.*\nFROM orders\n\
            WHERE orders.note IS NULL\n  \
            AND orders.id IN (1, 2, 3)\n  \
            AND orders.total BETWEEN 10 AND 20\n  \
            AND orders.status LIKE '5%'");
    }

    #[test]
    fn test_full_query_layout() {
        let mut state = orders();
        state.add_table("customers").unwrap();
        state.select_columns("customers", &["country"]).unwrap();
        state.add_join(QueryJoin::inner("orders", "customer_id", "customers", "id")).unwrap();
        state.add_column_aggregate(ColumnAggregate::new(AggregateFunction::Sum, "orders", "total", Some("revenue"))).unwrap();
        state.add_select_aggregate(SelectAggregate::star(AggregateFunction::Count, Some("n"))).unwrap();
        state.add_filter(QueryFilter::new("customers.country", FilterOperator::NotEq, "FR")).unwrap();
        state.add_group_by("customers.country").unwrap();
        state.add_having(HavingCondition::new(AggregateFunction::Count, "*", HavingOperator::Gt, "5")).unwrap();
        state.add_order_by(OrderByColumn::desc("revenue")).unwrap();
        state.set_limit(Some(QueryLimit::Count(10)));
        state.set_offset(Some(5));

        let expected = "SELECT customers.country, SUM(orders.total) AS revenue, COUNT(*) AS n\n\
            FROM orders\n  INNER JOIN customers ON orders.customer_id = customers.id\n\
            WHERE customers.country != 'FR'\n\
            GROUP BY customers.country\n\
            HAVING COUNT(*) > 5\n\
            ORDER BY revenue DESC\n\
            LIMIT 10\n\
            OFFSET 5";
        assert_eq!(SqlBuilder::generate(state.query()), expected);
    }

    #[test]
    fn test_subquery_filter_and_cte() {
        let mut inner = VisualQueryState::new();
        inner.add_table("customers").unwrap();
        inner.select_columns("customers", &["id"]).unwrap();

        let mut recent = VisualQueryState::new();
        recent.add_table("orders").unwrap();
        recent.select_columns("orders", &["customer_id"]).unwrap();

        let mut state = VisualQueryState::new();
        state.add_cte("recent", recent.to_parsed_query()).unwrap();
        state.add_cte_reference("recent").unwrap();
        state.add_filter(QueryFilter::new("recent.customer_id", FilterOperator::In, "")).unwrap();
        state.attach_subquery(0, inner.to_parsed_query()).unwrap();

        let expected = "WITH recent AS (\n  SELECT orders.customer_id\n  FROM orders\n)\n\
            SELECT recent.*\n\
            FROM recent\n\
            WHERE recent.customer_id IN (\n    SELECT customers.id\n    FROM customers\n  )";
        assert_eq!(SqlBuilder::generate(state.query()), expected);
    }

    #[test]
    fn test_derived_table_and_correlated_value() {
        let mut derived = ParsedQuery::new();
        derived.tables.push(QueryTable::new("orders").with_columns(&["id", "customer_id"]));

        let mut correlated = ParsedQuery::new();
        correlated.tables.push(QueryTable::new("customers").with_columns(&["name"]));
        correlated.filters.push(QueryFilter::new("customers.id", FilterOperator::Eq, "big.customer_id"));

        let mut query = ParsedQuery::new();
        query.tables.push(QueryTable::new("big").with_columns(&["id"]));
        query.subqueries.push(Subquery::new("subquery_0", SubqueryRole::From, derived).with_alias("big"));
        query.subqueries.push(Subquery::new("subquery_1", SubqueryRole::Select, correlated).with_alias("customer"));

        let expected = "SELECT big.id, (\n    SELECT customers.name\n    FROM customers\n    \
            WHERE customers.id = big.customer_id\n  ) AS customer\n\
            FROM (\n  SELECT orders.id, orders.customer_id\n  FROM orders\n) AS big";
        assert_eq!(SqlBuilder::generate(&query), expected);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut state = orders();
        state.select_columns("orders", &["id", "total", "status"]).unwrap();
        state.set_distinct(true);
        let first = SqlBuilder::generate(state.query());
        assert_eq!(first, SqlBuilder::generate(state.query()));
        assert!(first.starts_with("SELECT DISTINCT orders.id, orders.total, orders.status"));
    }

    #[test]
    fn test_unjoined_tables_are_cross_joined_in_place() {
        let mut state = orders();
        state.add_table("regions").unwrap();
        state.add_table("customers").unwrap();
        state.add_join(QueryJoin::inner("orders", "customer_id", "customers", "id")).unwrap();
        assert_eq!(
            SqlBuilder::generate(state.query()),
            "SELECT orders.*\nFROM orders\n  INNER JOIN customers ON orders.customer_id = customers.id\n  CROSS JOIN regions"
        );

        let mut state = orders();
        state.add_table("customers").unwrap();
        state.add_table("regions").unwrap();
        state.add_join(QueryJoin::inner("orders", "customer_id", "customers", "id")).unwrap();
        assert_eq!(
            SqlBuilder::generate(state.query()),
            "SELECT orders.*\nFROM orders\n  INNER JOIN customers ON orders.customer_id = customers.id\n  CROSS JOIN regions"
        );
    }

    #[test]
    fn test_unjoined_join_source_is_cross_joined_first() {
        let mut state = orders();
        state.add_table("customers").unwrap();
        state.add_table("regions").unwrap();
        state.add_join(QueryJoin::left("customers", "region_id", "regions", "id")).unwrap();
        assert_eq!(
            SqlBuilder::generate(state.query()),
            "SELECT orders.*\nFROM orders\n  CROSS JOIN customers\n  LEFT JOIN regions ON customers.region_id = regions.id"
        );
    }

    #[test]
    fn test_join_source_is_listed_before_its_target() {
        let mut state = orders();
        state.add_table("regions").unwrap();
        state.add_table("customers").unwrap();
        state.add_join(QueryJoin::inner("customers", "region_id", "regions", "id")).unwrap();
        state.add_join(QueryJoin::inner("orders", "customer_id", "customers", "id")).unwrap();
        assert_eq!(
            SqlBuilder::generate(state.query()),
            "SELECT orders.*\nFROM orders\n  \
             INNER JOIN customers ON orders.customer_id = customers.id\n  \
             INNER JOIN regions ON customers.region_id = regions.id"
        );
    }
}
