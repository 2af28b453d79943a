use once_cell::sync::Lazy;
use regex::Regex;

static SINGLE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{\{\w+\}\}$").expect("placeholder pattern is valid")
});

/// True when the trimmed value is non-empty and reads as a finite number.
pub fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    // f64::from_str accepts "inf" / "nan" spellings that are not SQL numbers
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return false;
    }
    trimmed.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)
}

/// True when the whole value is exactly one `{{name}}` placeholder.
pub fn is_parameter_placeholder(value: &str) -> bool {
    SINGLE_PLACEHOLDER.is_match(value.trim())
}

/// Single-quote a string literal, doubling embedded quotes.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Numbers and placeholders are emitted verbatim, everything else quoted.
pub fn format_literal(value: &str) -> String {
    if is_numeric(value) || is_parameter_placeholder(value) {
        return value.trim().to_string();
    }
    quote_string(value)
}
