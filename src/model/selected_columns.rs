use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Marker stored alone in a selection when every column of a table whose
/// schema is unknown (CTE or derived table) is selected.
pub const ALL_COLUMNS: &str = "*";

/// The set of columns selected on one table.
///
/// Insertion order is kept for display and SQL generation, but equality is
/// order-insensitive. Serializes as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedColumns(IndexSet<String>);

impl SelectedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `["*"]` selection.
    pub fn all() -> Self {
        let mut set = IndexSet::new();
        set.insert(ALL_COLUMNS.to_string());
        Self(set)
    }

    pub fn is_all(&self) -> bool {
        self.0.len() == 1 && self.0.contains(ALL_COLUMNS)
    }

    /// Insert a column. Selecting a concrete column replaces the `*` marker,
    /// selecting `*` replaces every concrete column. Returns `true` when the
    /// set changed.
    pub fn insert(&mut self, column: &str) -> bool {
        if column == ALL_COLUMNS {
            if self.is_all() {
                return false;
            }
            *self = Self::all();
            return true;
        }
        if self.is_all() {
            self.0.clear();
        }
        self.0.insert(column.to_string())
    }

    pub fn remove(&mut self, column: &str) -> bool {
        self.0.shift_remove(column)
    }

    /// Flip a column in or out of the selection; returns whether it is now selected.
    pub fn toggle(&mut self, column: &str) -> bool {
        if self.remove(column) {
            return false;
        }
        self.insert(column);
        true
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Columns in lexical order, for order-insensitive comparison.
    pub fn sorted(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.0.iter().map(String::as_str).collect();
        columns.sort_unstable();
        columns
    }
}

impl<S: Into<String>> FromIterator<S> for SelectedColumns {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a SelectedColumns {
    type Item = &'a String;
    type IntoIter = indexmap::set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
