use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderByColumn {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderByColumn {
    pub fn asc(column: &str) -> Self {
        Self { column: column.to_string(), direction: SortDirection::Asc }
    }

    pub fn desc(column: &str) -> Self {
        Self { column: column.to_string(), direction: SortDirection::Desc }
    }
}

/// A fully qualified `table.column` grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByColumn {
    pub column: String,
}

impl GroupByColumn {
    pub fn new(column: &str) -> Self {
        Self { column: column.to_string() }
    }
}
