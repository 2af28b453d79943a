use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// An equality join `source_table.source_column = target_table.target_column`
/// where `target_table` is the relation introduced by the JOIN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryJoin {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub join_type: JoinType,
}

impl QueryJoin {
    pub fn new(join_type: JoinType, source_table: &str, source_column: &str, target_table: &str, target_column: &str) -> Self {
        Self {
            source_table: source_table.to_string(),
            source_column: source_column.to_string(),
            target_table: target_table.to_string(),
            target_column: target_column.to_string(),
            join_type,
        }
    }

    pub fn inner(source_table: &str, source_column: &str, target_table: &str, target_column: &str) -> Self {
        Self::new(JoinType::Inner, source_table, source_column, target_table, target_column)
    }

    pub fn left(source_table: &str, source_column: &str, target_table: &str, target_column: &str) -> Self {
        Self::new(JoinType::Left, source_table, source_column, target_table, target_column)
    }

    pub fn involves(&self, table: &str) -> bool {
        self.source_table == table || self.target_table == table
    }
}
