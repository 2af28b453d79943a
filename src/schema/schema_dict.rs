use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::SchemaProvider;

/// A small dictionary describing the known tables of a schema.
///
/// The `tables` map stores the ordered column names keyed by table name. It is
/// the synchronous lookup handed to the translator for sample schemas and
/// tests; live connections usually implement [`SchemaProvider`] over their
/// own metadata cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDict {
    /// Map of table name -> column names in declaration order
    pub tables: IndexMap<String, Vec<String>>,
}

impl SchemaDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table definition.
    pub fn with_table<S: AsRef<str>>(mut self, table: &str, columns: &[S]) -> Self {
        self.insert_table(table, columns);
        self
    }

    pub fn insert_table<S: AsRef<str>>(&mut self, table: &str, columns: &[S]) {
        self.tables.insert(table.to_string(), columns.iter().map(|c| c.as_ref().to_string()).collect());
    }

    /// Return the columns of a table, matching the name case-insensitively.
    pub fn get(&self, table: &str) -> Option<&Vec<String>> {
        self.tables.get(table).or_else(|| {
            self.tables.iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(table))
                .map(|(_, columns)| columns)
        })
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

impl SchemaProvider for SchemaDict {
    fn columns_of(&self, table: &str) -> Option<Vec<String>> {
        self.get(table).cloned()
    }
}
