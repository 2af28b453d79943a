use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::SqlDialect,
    params::{ParamValue, param_scanner::PLACEHOLDER},
};

/// SQL ready for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutedQuery {
    pub sql: String,
    /// Placeholders without a value, left verbatim in `sql`.
    pub unresolved: IndexSet<String>,
}

impl SubstitutedQuery {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

pub struct ParamSubstitutor;

impl ParamSubstitutor {
    /// Replace every `{{name}}` with the literal of its value. Names with no
    /// value are kept as typed. A placeholder inside a single-quoted literal
    /// takes the escaped text alone, the literal already supplies the quotes.
    pub fn substitute_parameters(sql: &str, values: &IndexMap<String, ParamValue>, dialect: SqlDialect) -> SubstitutedQuery {
        let mut unresolved = IndexSet::new();
        let mut substituted = String::with_capacity(sql.len());
        let mut in_literal = false;
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(sql) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let before = &sql[last..whole.start()];
            in_literal ^= before.matches('\'').count() % 2 == 1;
            substituted.push_str(before);
            match values.get(name.as_str()) {
                Some(value) if in_literal => substituted.push_str(&value.to_literal_text(dialect)),
                Some(value) => substituted.push_str(&value.to_sql(dialect)),
                None => {
                    unresolved.insert(name.as_str().to_string());
                    substituted.push_str(whole.as_str());
                },
            }
            last = whole.end();
        }
        substituted.push_str(&sql[last..]);
        if !unresolved.is_empty() {
            debug!(?unresolved, "placeholders left without a value");
        }
        SubstitutedQuery { sql: substituted, unresolved }
    }
}
