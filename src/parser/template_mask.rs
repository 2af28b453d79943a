//! `{{name}}` placeholders are not SQL, so they are swapped for plain
//! identifiers before the text reaches the SQL parser and swapped back in
//! every value the translator produces.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::params::param_scanner::PLACEHOLDER;

static MASKED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__qsp_(\w+?)_qsp__").expect("masked placeholder pattern is valid")
});

static MASKED_EXACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^__qsp_(\w+?)_qsp__$").expect("masked placeholder pattern is valid")
});

pub struct TemplateMask;

impl TemplateMask {
    /// `{{id}}` -> `__qsp_id_qsp__`
    pub fn mask(sql: &str) -> Cow<'_, str> {
        PLACEHOLDER.replace_all(sql, "__qsp_${1}_qsp__")
    }

    /// Restore every masked placeholder inside `value`.
    pub fn unmask(value: &str) -> String {
        MASKED.replace_all(value, "{{${1}}}").into_owned()
    }

    /// `Some("{{id}}")` when the identifier is exactly one masked placeholder.
    pub fn placeholder(ident: &str) -> Option<String> {
        MASKED_EXACT.captures(ident).map(|caps| format!("{{{{{}}}}}", &caps[1]))
    }
}
