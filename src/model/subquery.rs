use serde::{Deserialize, Serialize};

use crate::model::ParsedQuery;

/// Where a nested SELECT appears in its parent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubqueryRole {
    #[default]
    Where,
    From,
    Select,
}

/// A nested SELECT owned by its parent query.
///
/// `Where` subqueries are linked to the filter (or having condition) whose
/// right-hand side they are through `linked_filter_index`; `From` and
/// `Select` subqueries carry the alias they are known by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subquery {
    pub id: String,
    pub role: SubqueryRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_filter_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub inner_query: Box<ParsedQuery>,
}

impl Subquery {
    pub fn new(id: impl Into<String>, role: SubqueryRole, inner_query: ParsedQuery) -> Self {
        Self {
            id: id.into(),
            role,
            linked_filter_index: None,
            alias: None,
            inner_query: Box::new(inner_query),
        }
    }

    pub fn linked_to(mut self, filter_index: usize) -> Self {
        self.linked_filter_index = Some(filter_index);
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }
}

/// One `WITH name AS (...)` member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonTableExpression {
    pub id: String,
    pub name: String,
    pub inner_query: Box<ParsedQuery>,
}

impl CommonTableExpression {
    pub fn new(id: impl Into<String>, name: &str, inner_query: ParsedQuery) -> Self {
        Self { id: id.into(), name: name.to_string(), inner_query: Box::new(inner_query) }
    }
}
