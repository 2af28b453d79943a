use serde::{Deserialize, Serialize};

use crate::model::{AggregateFunction, Connector, FilterOperator, HavingOperator};

/// One WHERE condition. `connector` joins it to the previous filter.
/// When the right-hand side is a nested query, `subquery_index` points into
/// the owning query's `subqueries` and `value` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub connector: Connector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subquery_index: Option<usize>,
}

impl QueryFilter {
    pub fn new(column: &str, operator: FilterOperator, value: &str) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: value.to_string(),
            ..Default::default()
        }
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }

    /// Table part of the qualified column, if any.
    pub fn table(&self) -> Option<&str> {
        self.column.split_once('.').map(|(table, _)| table)
    }
}

/// One HAVING condition over an aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HavingCondition {
    pub aggregate_function: AggregateFunction,
    pub column: String,
    pub operator: HavingOperator,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub connector: Connector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subquery_index: Option<usize>,
}

impl HavingCondition {
    pub fn new(aggregate_function: AggregateFunction, column: &str, operator: HavingOperator, value: &str) -> Self {
        Self {
            aggregate_function,
            column: column.to_string(),
            operator,
            value: value.to_string(),
            ..Default::default()
        }
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }
}
