pub mod schema_dict;
pub use schema_dict::*;

pub trait SchemaProvider {
    /// Given a table name, return its column names if the schema is known.
    fn columns_of(&self, table: &str) -> Option<Vec<String>>;
}

/// Provider for live connections whose metadata has not been fetched yet:
/// every lookup is unknown, so `*` is never expanded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSchema;

impl SchemaProvider for NoSchema {
    fn columns_of(&self, _table: &str) -> Option<Vec<String>> {
        None
    }
}

impl<F> SchemaProvider for F
where
    F: Fn(&str) -> Option<Vec<String>>,
{
    fn columns_of(&self, table: &str) -> Option<Vec<String>> {
        self(table)
    }
}
