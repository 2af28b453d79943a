use indexmap::IndexMap;

use crate::{
    parser::ParseError,
    schema::SchemaProvider,
};

/// Name resolution state for one SELECT level.
pub struct TranslationContext<'a> {
    /// access to schemas
    pub schemas: &'a dyn SchemaProvider,
    /// allow-list of real table names; `None` accepts any table
    pub valid_table_names: Option<&'a [String]>,
    pub max_depth: usize,
    /// 0 for the top-level statement, +1 per nested subquery or CTE body
    pub depth: usize,
    /// lowercased visible name (alias or table) -> table name as stored in `tables`
    pub collections: IndexMap<String, String>,
    /// the same map for every enclosing query, innermost first wins
    pub outer_collections: IndexMap<String, String>,
    /// lowercased CTE name -> projected columns, for each CTE in scope
    pub ctes: IndexMap<String, Vec<String>>,
    /// lowercased derived-table alias -> projected columns
    pub derived: IndexMap<String, Vec<String>>,
}

impl<'a> TranslationContext<'a> {
    pub fn new(schemas: &'a dyn SchemaProvider, valid_table_names: Option<&'a [String]>, max_depth: usize) -> Self {
        Self {
            schemas,
            valid_table_names,
            max_depth,
            depth: 0,
            collections: IndexMap::new(),
            outer_collections: IndexMap::new(),
            ctes: IndexMap::new(),
            derived: IndexMap::new(),
        }
    }

    /// Context for a subquery or CTE body one level down. Enclosing names
    /// stay visible for correlated references; CTEs stay in scope.
    pub fn nested(&self) -> Result<TranslationContext<'a>, ParseError> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(ParseError::DepthExceeded(self.max_depth));
        }
        let mut outer = self.outer_collections.clone();
        for (visible, table) in &self.collections {
            outer.insert(visible.clone(), table.clone());
        }
        Ok(TranslationContext {
            schemas: self.schemas,
            valid_table_names: self.valid_table_names,
            max_depth: self.max_depth,
            depth,
            collections: IndexMap::new(),
            outer_collections: outer,
            ctes: self.ctes.clone(),
            derived: IndexMap::new(),
        })
    }

    /// Make `table` reachable under its own name and under `alias`.
    pub fn add_collection(&mut self, table: &str, alias: Option<&str>) {
        self.collections.insert(table.to_lowercase(), table.to_string());
        if let Some(alias) = alias {
            self.collections.insert(alias.to_lowercase(), table.to_string());
        }
    }

    pub fn add_cte(&mut self, name: &str, columns: Vec<String>) {
        self.ctes.insert(name.to_lowercase(), columns);
    }

    pub fn add_derived(&mut self, alias: &str, columns: Vec<String>) {
        self.derived.insert(alias.to_lowercase(), columns);
    }

    pub fn is_cte(&self, name: &str) -> bool {
        self.ctes.contains_key(&name.to_lowercase())
    }

    pub fn is_derived(&self, name: &str) -> bool {
        self.derived.contains_key(&name.to_lowercase())
    }

    /// Table name for a qualifier, looking outwards through enclosing queries.
    pub fn resolve_collection(&self, visible: &str) -> Option<&str> {
        let key = visible.to_lowercase();
        self.collections.get(&key)
            .or_else(|| self.outer_collections.get(&key))
            .map(String::as_str)
    }

    /// Whether a real table passes the allow-list.
    pub fn accepts_table(&self, name: &str) -> bool {
        match self.valid_table_names {
            None => true,
            Some(valid) => valid.iter().any(|v| v.eq_ignore_ascii_case(name)),
        }
    }

    /// Known columns of a table, CTE or derived table.
    pub fn columns_of(&self, table: &str) -> Option<Vec<String>> {
        let key = table.to_lowercase();
        if let Some(columns) = self.derived.get(&key) {
            return Some(columns.clone());
        }
        if let Some(columns) = self.ctes.get(&key) {
            return Some(columns.clone());
        }
        self.schemas.columns_of(table)
    }
}
