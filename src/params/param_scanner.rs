use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::params::QueryParameter;

pub(crate) static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid")
});

/// Finds `{{name}}` placeholders in SQL text.
pub struct ParamScanner;

impl ParamScanner {
    pub fn has_parameters(sql: &str) -> bool {
        PLACEHOLDER.is_match(sql)
    }

    /// Distinct names in first-occurrence order.
    pub fn extract_parameters(sql: &str) -> IndexSet<String> {
        PLACEHOLDER.captures_iter(sql)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
            .collect()
    }

    /// One empty text prompt per name.
    pub fn create_default_parameters<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<QueryParameter> {
        names.into_iter().map(|name| QueryParameter::text(name)).collect()
    }
}
