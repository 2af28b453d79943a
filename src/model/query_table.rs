use serde::{Deserialize, Serialize};

use crate::model::SelectedColumns;

/// A table placed on the canvas (or named in FROM/JOIN).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTable {
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub selected_columns: SelectedColumns,
    #[serde(default)]
    pub is_cte_reference: bool,
}

impl QueryTable {
    pub fn new(table_name: &str) -> Self {
        Self { table_name: table_name.to_string(), ..Default::default() }
    }

    pub fn cte_reference(name: &str) -> Self {
        Self { table_name: name.to_string(), is_cte_reference: true, ..Default::default() }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn with_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        for column in columns {
            self.selected_columns.insert(column.as_ref());
        }
        self
    }

    /// Whether `name` refers to this table, by alias or by table name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.alias.as_deref().is_some_and(|alias| alias.eq_ignore_ascii_case(name)) ||
            self.table_name.eq_ignore_ascii_case(name)
    }
}
