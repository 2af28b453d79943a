use sqlparser::{
    ast::{Query, SetExpr, Statement},
    parser::Parser,
};
use tracing::debug;

use crate::{
    config::{EngineConfig, MAX_NESTING_DEPTH, SqlDialect},
    model::ParsedQuery,
    parser::{
        CteResolver, GroupByResolver, HavingResolver, LimitOffsetResolver, OrderByResolver, ParseError,
        PredicateResolver, ProjectionResolver, TableResolver, TemplateMask, TranslationContext,
    },
    schema::SchemaProvider,
};

/// Turns SQL text into a [`ParsedQuery`].
///
/// Parsing is a pure function of its inputs: a fresh tree is built on every
/// call and nothing outside it is touched. Constructs the model cannot hold
/// (unknown tables, non-equality joins, window functions, exotic predicates)
/// are dropped and logged rather than reported as errors.
pub struct QueryTranslator;

impl QueryTranslator {
    /// Parse with the default configuration. `valid_table_names = None`
    /// accepts any table; a list restricts FROM/JOIN to those names.
    pub fn parse(sql: &str, valid_table_names: Option<&[String]>, schemas: &dyn SchemaProvider) -> Result<ParsedQuery, ParseError> {
        let config = EngineConfig::default();
        Self::translate(sql, config.dialect, valid_table_names, config.max_depth, schemas)
    }

    pub fn parse_with_config(sql: &str, config: &EngineConfig, schemas: &dyn SchemaProvider) -> Result<ParsedQuery, ParseError> {
        Self::translate(sql, config.dialect, config.valid_table_names.as_deref(), config.max_depth, schemas)
    }

    fn translate(
        sql: &str,
        dialect: SqlDialect,
        valid_table_names: Option<&[String]>,
        max_depth: usize,
        schemas: &dyn SchemaProvider,
    ) -> Result<ParsedQuery, ParseError> {
        if sql.trim().is_empty() {
            return Ok(ParsedQuery::default());
        }
        let max_depth = max_depth.min(MAX_NESTING_DEPTH);

        let masked = TemplateMask::mask(sql);
        let parser_dialect = dialect.parser_dialect();
        let statements = Parser::new(parser_dialect.as_ref())
            .with_recursion_limit(Self::recursion_limit(max_depth))
            .try_with_sql(&masked)
            .and_then(|mut parser| parser.parse_statements())
            .map_err(|err| ParseError::from_parser(err, max_depth))?;

        let statement = match statements.as_slice() {
            [] => return Ok(ParsedQuery::default()),
            [statement] => statement,
            many => return Err(ParseError::MultipleStatements(many.len())),
        };
        let Statement::Query(query) = statement else {
            return Err(ParseError::NotASelect(Self::statement_kind(statement)));
        };

        // the model is anchored on a FROM table; a bare projection has nothing to show
        if let SetExpr::Select(select) = query.body.as_ref() {
            if select.from.is_empty() {
                return Err(ParseError::Unsupported("SELECT without FROM".to_string()));
            }
        }

        let mut ctx = TranslationContext::new(schemas, valid_table_names, max_depth);
        let parsed = Self::translate_query(query, &mut ctx)?;
        debug!(
            dialect = %dialect,
            tables = parsed.tables.len(),
            filters = parsed.filters.len(),
            subqueries = parsed.subqueries.len(),
            ctes = parsed.ctes.len(),
            "translated SELECT"
        );
        Ok(parsed)
    }

    /// Translate one SELECT level in the given context.
    pub(crate) fn translate_query(query: &Query, ctx: &mut TranslationContext) -> Result<ParsedQuery, ParseError> {
        let mut parsed = ParsedQuery::new();
        if let Some(with) = &query.with {
            CteResolver::resolve(with, &mut parsed, ctx)?;
        }

        let select = match query.body.as_ref() {
            SetExpr::Select(select) => select,
            SetExpr::Query(inner) if parsed.ctes.is_empty() && query.order_by.is_empty() && query.limit.is_none() => {
                return Self::translate_query(inner, ctx);
            },
            SetExpr::SetOperation { op, .. } => return Err(ParseError::Unsupported(format!("{} of queries", op))),
            other => return Err(ParseError::Unsupported(Self::body_kind(other))),
        };

        parsed.distinct = select.distinct.is_some();
        TableResolver::resolve_from(&select.from, &mut parsed, ctx)?;
        ProjectionResolver::resolve(&select.projection, &mut parsed, ctx)?;
        if let Some(selection) = &select.selection {
            PredicateResolver::resolve_where(selection, &mut parsed, ctx)?;
        }
        GroupByResolver::resolve(&select.group_by, &mut parsed, ctx);
        if let Some(having) = &select.having {
            HavingResolver::resolve(having, &mut parsed, ctx)?;
        }
        OrderByResolver::resolve(&query.order_by, &mut parsed, ctx);
        LimitOffsetResolver::resolve(query, &mut parsed);
        parsed.order_for_joins();
        Ok(parsed)
    }

    /// Translate a subquery, CTE body or derived table one level down.
    pub(crate) fn translate_nested(query: &Query, ctx: &TranslationContext) -> Result<ParsedQuery, ParseError> {
        let mut child = ctx.nested()?;
        Self::translate_query(query, &mut child)
    }

    /// The SQL parser counts expression nesting as well as query nesting, so
    /// it gets more room than `max_depth` alone.
    fn recursion_limit(max_depth: usize) -> usize {
        max_depth.saturating_add(1).saturating_mul(8).max(50)
    }

    fn statement_kind(statement: &Statement) -> String {
        statement.to_string()
            .split_whitespace()
            .next()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "an empty statement".to_string())
    }

    fn body_kind(body: &SetExpr) -> String {
        match body {
            SetExpr::Values(_) => "VALUES list".to_string(),
            SetExpr::Table(_) => "TABLE statement".to_string(),
            SetExpr::Query(_) => "parenthesized query with its own clauses".to_string(),
            _ => "non-SELECT query body".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{AggregateFunction, Connector, FilterOperator, HavingOperator, JoinType, QueryLimit, SortDirection, SubqueryRole},
        schema::{NoSchema, SchemaDict},
    };

    fn schemas() -> SchemaDict {
        SchemaDict::new()
            .with_table("orders", &["id", "customer_id", "total", "status", "created_at"])
            .with_table("customers", &["id", "name", "country"])
            .with_table("products", &["id", "title", "price"])
    }

    fn parse(sql: &str) -> ParsedQuery {
        QueryTranslator::parse(sql, None, &schemas()).expect("Failed to parse query")
    }

    #[test]
    fn test_empty_input_yields_empty_query() {
        assert_eq!(QueryTranslator::parse("", None, &NoSchema).unwrap(), ParsedQuery::default());
        assert_eq!(QueryTranslator::parse("  \n ", None, &NoSchema).unwrap(), ParsedQuery::default());
    }

    #[test]
    fn test_rejects_non_select() {
        let err = QueryTranslator::parse("DELETE FROM orders", None, &NoSchema).unwrap_err();
        assert!(matches!(err, ParseError::NotASelect(kind) if kind == "DELETE"));
        let err = QueryTranslator::parse("SELECT 1; SELECT 2", None, &NoSchema).unwrap_err();
        assert_eq!(err, ParseError::MultipleStatements(2));
        assert!(QueryTranslator::parse("SELECT FROM", None, &NoSchema).is_err());
        assert!(matches!(QueryTranslator::parse("SELECT * FROM", None, &NoSchema), Err(ParseError::Syntax(_))));
        assert!(matches!(QueryTranslator::parse("SELECT 1", None, &NoSchema), Err(ParseError::Unsupported(_))));
        let err = QueryTranslator::parse("SELECT id FROM a UNION SELECT id FROM b", None, &NoSchema).unwrap_err();
        assert!(matches!(err, ParseError::Unsupported(_)));
    }

    #[test]
    fn test_star_expands_through_schema() {
        let query = parse("SELECT * FROM customers");
        assert_eq!(query.tables.len(), 1);
        assert_eq!(query.tables[0].selected_columns.sorted(), vec!["country", "id", "name"]);
    }

    #[test]
    fn test_star_without_schema_selects_nothing() {
        let query = QueryTranslator::parse("SELECT * FROM orders", None, &NoSchema).unwrap();
        assert!(query.tables[0].selected_columns.is_empty());
    }

    #[test]
    fn test_join_and_filters() {
        let query = parse(
            "SELECT o.id, c.name FROM orders o LEFT JOIN customers c ON c.id = o.customer_id \
             WHERE o.total >= 100 AND c.country = 'USA' OR o.status IS NULL",
        );
        assert_eq!(query.tables[0].table_name, "orders");
        assert_eq!(query.tables[0].alias.as_deref(), Some("o"));
        assert_eq!(query.joins.len(), 1);
        let join = &query.joins[0];
        assert_eq!(join.join_type, JoinType::Left);
        assert_eq!((join.source_table.as_str(), join.source_column.as_str()), ("orders", "customer_id"));
        assert_eq!((join.target_table.as_str(), join.target_column.as_str()), ("customers", "id"));

        assert_eq!(query.filters.len(), 3);
        assert_eq!(query.filters[0].column, "orders.total");
        assert_eq!(query.filters[0].operator, FilterOperator::GtEq);
        assert_eq!(query.filters[0].value, "100");
        assert_eq!(query.filters[1].value, "USA");
        assert_eq!(query.filters[1].connector, Connector::And);
        assert_eq!(query.filters[2].operator, FilterOperator::IsNull);
        assert_eq!(query.filters[2].connector, Connector::Or);
    }

    #[test]
    fn test_non_equality_join_keeps_tables() {
        let query = parse("SELECT * FROM orders JOIN customers ON orders.customer_id > customers.id");
        assert_eq!(query.tables.len(), 2);
        assert!(query.joins.is_empty());
    }

    #[test]
    fn test_cross_join_and_comma_tables_are_unjoined() {
        let query = parse(
            "SELECT * FROM orders\n  INNER JOIN customers ON orders.customer_id = customers.id\n  CROSS JOIN products",
        );
        let names: Vec<&str> = query.tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["orders", "customers", "products"]);
        assert_eq!(query.joins.len(), 1);

        let query = parse("SELECT * FROM orders CROSS JOIN products JOIN customers ON orders.customer_id = customers.id");
        let names: Vec<&str> = query.tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["orders", "customers", "products"]);

        let query = parse("SELECT * FROM orders, products JOIN customers ON products.id = customers.id");
        let names: Vec<&str> = query.tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["orders", "products", "customers"]);
        assert_eq!(query.joins[0].source_table, "products");
    }

    #[test]
    fn test_unknown_table_is_omitted() {
        let valid = vec!["orders".to_string()];
        let query = QueryTranslator::parse(
            "SELECT * FROM orders JOIN ghost ON orders.id = ghost.order_id",
            Some(&valid),
            &NoSchema,
        ).unwrap();
        assert_eq!(query.tables.len(), 1);
        assert_eq!(query.tables[0].table_name, "orders");
        assert!(query.joins.is_empty());
    }

    #[test]
    fn test_only_unknown_tables_yields_empty_tables() {
        let valid = vec!["orders".to_string()];
        let query = QueryTranslator::parse("SELECT * FROM ghost", Some(&valid), &NoSchema).unwrap();
        assert!(query.tables.is_empty());
    }

    #[test]
    fn test_in_subquery() {
        let query = QueryTranslator::parse(
            "SELECT * FROM orders WHERE customer_id IN (SELECT id FROM customers WHERE country = 'USA')",
            None,
            &NoSchema,
        ).unwrap();
        assert_eq!(query.tables.len(), 1);
        assert_eq!(query.filters.len(), 1);
        let filter = &query.filters[0];
        assert_eq!(filter.operator, FilterOperator::In);
        assert_eq!(filter.subquery_index, Some(0));
        assert!(filter.value.is_empty());

        let subquery = &query.subqueries[0];
        assert_eq!(subquery.role, SubqueryRole::Where);
        assert_eq!(subquery.linked_filter_index, Some(0));
        assert_eq!(subquery.inner_query.tables[0].table_name, "customers");
        assert_eq!(subquery.inner_query.filters.len(), 1);
        assert_eq!(subquery.inner_query.filters[0].column, "customers.country");
    }

    #[test]
    fn test_correlated_subquery_resolves_outer_alias() {
        let query = parse(
            "SELECT c.name FROM customers c WHERE c.id IN \
             (SELECT o.customer_id FROM orders o WHERE o.customer_id = c.id)",
        );
        let inner = &query.subqueries[0].inner_query;
        assert_eq!(inner.filters[0].column, "orders.customer_id");
        assert_eq!(inner.filters[0].value, "customers.id");
    }

    #[test]
    fn test_cte_reference() {
        let query = QueryTranslator::parse("WITH recent AS (SELECT id FROM orders) SELECT * FROM recent", None, &NoSchema).unwrap();
        assert_eq!(query.ctes.len(), 1);
        assert_eq!(query.ctes[0].name, "recent");
        assert_eq!(query.ctes[0].inner_query.tables[0].table_name, "orders");
        assert_eq!(query.tables[0].table_name, "recent");
        assert!(query.tables[0].is_cte_reference);
        assert!(query.tables[0].selected_columns.is_all());
    }

    #[test]
    fn test_unqualified_column_resolves_against_cte_columns() {
        let query = parse(
            "WITH big AS (SELECT id, total FROM orders WHERE total > 500) \
             SELECT customers.name FROM customers JOIN big ON big.id = customers.id WHERE total > 900",
        );
        assert_eq!(query.filters[0].column, "big.total");
    }

    #[test]
    fn test_derived_table() {
        let query = parse("SELECT t.id FROM (SELECT id FROM orders WHERE total > 10) AS t");
        assert_eq!(query.tables[0].table_name, "t");
        assert!(!query.tables[0].is_cte_reference);
        assert_eq!(query.subqueries[0].role, SubqueryRole::From);
        assert_eq!(query.subqueries[0].alias.as_deref(), Some("t"));
        assert!(query.tables[0].selected_columns.contains("id"));
    }

    #[test]
    fn test_aggregates_group_by_having() {
        let query = parse(
            "SELECT customers.country, COUNT(*) AS n, SUM(orders.total) AS revenue \
             FROM orders JOIN customers ON orders.customer_id = customers.id \
             GROUP BY customers.country HAVING COUNT(*) > 5 AND SUM(orders.total) >= 1000 \
             ORDER BY revenue DESC LIMIT 10 OFFSET 20",
        );
        assert_eq!(query.select_aggregates.len(), 1);
        assert_eq!(query.select_aggregates[0].function, AggregateFunction::Count);
        assert_eq!(query.select_aggregates[0].alias.as_deref(), Some("n"));
        assert_eq!(query.column_aggregates.len(), 1);
        assert_eq!(query.column_aggregates[0].table_name, "orders");
        assert!(query.tables[0].selected_columns.contains("total"));

        assert_eq!(query.group_by[0].column, "customers.country");
        assert_eq!(query.having.len(), 2);
        assert_eq!(query.having[0].column, "*");
        assert_eq!(query.having[0].operator, HavingOperator::Gt);
        assert_eq!(query.having[1].column, "orders.total");
        assert_eq!(query.having[1].value, "1000");

        assert_eq!(query.order_by[0].column, "revenue");
        assert_eq!(query.order_by[0].direction, SortDirection::Desc);
        assert_eq!(query.limit, Some(QueryLimit::Count(10)));
        assert_eq!(query.offset, Some(20));
    }

    #[test]
    fn test_operators() {
        let query = parse(
            "SELECT * FROM orders WHERE status IN ('new', 'paid') AND total BETWEEN 10 AND 20 \
             AND status NOT LIKE 'x%' AND customer_id NOT IN (1, 2) AND id <> 3 AND 5 < total",
        );
        let ops: Vec<(FilterOperator, &str)> = query.filters.iter().map(|f| (f.operator, f.value.as_str())).collect();
        assert_eq!(ops, vec![
            (FilterOperator::In, "'new', 'paid'"),
            (FilterOperator::Between, "10 AND 20"),
            (FilterOperator::NotLike, "x%"),
            (FilterOperator::NotIn, "1, 2"),
            (FilterOperator::NotEq, "3"),
            (FilterOperator::Gt, "5"),
        ]);
    }

    #[test]
    fn test_placeholders_survive_parsing() {
        let query = parse("SELECT * FROM orders WHERE customer_id = {{customer}} AND status LIKE '%{{term}}%' LIMIT {{rows}}");
        assert_eq!(query.filters[0].value, "{{customer}}");
        assert_eq!(query.filters[1].value, "%{{term}}%");
        assert_eq!(query.limit, Some(QueryLimit::Parameter("{{rows}}".to_string())));
    }

    #[test]
    fn test_window_function_dropped() {
        let query = parse("SELECT orders.id, ROW_NUMBER() OVER (ORDER BY orders.total) AS rn FROM orders");
        assert!(query.select_aggregates.is_empty());
        assert_eq!(query.tables[0].selected_columns.sorted(), vec!["id"]);
    }

    #[test]
    fn test_depth_limit() {
        let config = EngineConfig::new().with_max_depth(1);
        let sql = "SELECT * FROM a WHERE x IN (SELECT x FROM b WHERE y IN (SELECT y FROM c))";
        let err = QueryTranslator::parse_with_config(sql, &config, &NoSchema).unwrap_err();
        assert_eq!(err, ParseError::DepthExceeded(1));
        let config = EngineConfig::new().with_max_depth(2);
        assert!(QueryTranslator::parse_with_config(sql, &config, &NoSchema).is_ok());
    }

    #[test]
    fn test_distinct_and_dialect() {
        let config = EngineConfig::live(SqlDialect::MySql);
        let query = QueryTranslator::parse_with_config("SELECT DISTINCT `orders`.`id` FROM `orders`", &config, &NoSchema).unwrap();
        assert!(query.distinct);
        assert_eq!(query.tables[0].table_name, "orders");
        assert!(query.tables[0].selected_columns.contains("id"));
    }
}
