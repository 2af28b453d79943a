use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{config::SqlDialect, format::is_numeric, params::ParameterError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_SQL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Input widget kind for one `{{name}}` prompt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterType::Text => "text",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
            ParameterType::Date => "date",
            ParameterType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A prompt shown before executing a templated query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: ParameterType,
    #[serde(default)]
    pub default_value: String,
}

impl QueryParameter {
    pub fn text(name: &str) -> Self {
        Self { name: name.to_string(), param_type: ParameterType::Text, default_value: String::new() }
    }
}

/// Typed value bound to a placeholder at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    Text(String),
    Number(NotNan<f64>),
    Boolean(bool),
    Date(NaiveDate),
    #[serde(rename = "datetime")]
    DateTime(NaiveDateTime),
    Null,
}

impl ParamValue {
    /// Read raw UI input as `param_type`. Blank input for anything but text
    /// is `Null`.
    pub fn coerce(param_type: ParameterType, raw: &str) -> Result<ParamValue, ParameterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() && param_type != ParameterType::Text {
            return Ok(ParamValue::Null);
        }
        let invalid = || ParameterError::new(param_type, raw);
        match param_type {
            ParameterType::Text => Ok(ParamValue::Text(raw.to_string())),
            ParameterType::Number => {
                if !is_numeric(trimmed) {
                    return Err(invalid());
                }
                let number = trimmed.parse::<f64>().map_err(|_| invalid())?;
                NotNan::new(number).map(ParamValue::Number).map_err(|_| invalid())
            },
            ParameterType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" | "on" => Ok(ParamValue::Boolean(true)),
                "false" | "f" | "no" | "n" | "0" | "off" => Ok(ParamValue::Boolean(false)),
                _ => Err(invalid()),
            },
            ParameterType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(ParamValue::Date)
                .map_err(|_| invalid()),
            ParameterType::DateTime => DATETIME_FORMATS.iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(ParamValue::DateTime)
                .ok_or_else(invalid),
        }
    }

    /// SQL literal for this value in `dialect`.
    pub fn to_sql(&self, dialect: SqlDialect) -> String {
        match self {
            ParamValue::Text(text) => dialect.quote_text(text),
            ParamValue::Number(number) => number.into_inner().to_string(),
            ParamValue::Boolean(value) => dialect.boolean_literal(*value).to_string(),
            ParamValue::Date(date) => dialect.quote_temporal(&date.format(DATE_FORMAT).to_string()),
            ParamValue::DateTime(at) => dialect.quote_temporal(&at.format(DATETIME_SQL_FORMAT).to_string()),
            ParamValue::Null => "NULL".to_string(),
        }
    }

    /// Text of this value spliced into a literal the SQL already quotes,
    /// as in `LIKE '%{{term}}%'`. Null leaves nothing behind.
    pub fn to_literal_text(&self, dialect: SqlDialect) -> String {
        match self {
            ParamValue::Text(text) => dialect.escape_text(text),
            ParamValue::Date(date) => date.format(DATE_FORMAT).to_string(),
            ParamValue::DateTime(at) => at.format(DATETIME_SQL_FORMAT).to_string(),
            ParamValue::Null => String::new(),
            ParamValue::Number(_) | ParamValue::Boolean(_) => self.to_sql(dialect),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(text: &str) -> Self {
        ParamValue::Text(text.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        NotNan::new(value as f64).map(ParamValue::Number).unwrap_or(ParamValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(ParamValue::coerce(ParameterType::Number, " 42 ").unwrap(), ParamValue::from(42));
        assert_eq!(ParamValue::coerce(ParameterType::Number, "").unwrap(), ParamValue::Null);
        let err = ParamValue::coerce(ParameterType::Number, "NaN").unwrap_err();
        assert_eq!(err, ParameterError::new(ParameterType::Number, "NaN"));
        assert_eq!(err.to_string(), "parameter value 'NaN' is not a valid number");
    }

    #[test]
    fn test_coerce_boolean_and_dates() {
        assert_eq!(ParamValue::coerce(ParameterType::Boolean, "Yes").unwrap(), ParamValue::Boolean(true));
        assert!(ParamValue::coerce(ParameterType::Boolean, "maybe").is_err());

        let date = ParamValue::coerce(ParameterType::Date, "2024-02-29").expect("Failed to read date");
        assert_eq!(date.to_sql(SqlDialect::PostgreSql), "'2024-02-29'");
        assert!(ParamValue::coerce(ParameterType::Date, "2023-02-29").is_err());

        let at = ParamValue::coerce(ParameterType::DateTime, "2024-01-05T10:30").expect("Failed to read datetime");
        assert_eq!(at.to_sql(SqlDialect::Generic), "'2024-01-05 10:30:00'");
        let midnight = ParamValue::coerce(ParameterType::DateTime, "2024-01-05").unwrap();
        assert_eq!(midnight.to_sql(SqlDialect::Generic), "'2024-01-05 00:00:00'");
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        assert_eq!(ParamValue::coerce(ParameterType::Text, "  ").unwrap(), ParamValue::Text("  ".into()));
    }

    #[test]
    fn test_to_sql_per_dialect() {
        let text = ParamValue::from("O'Brien");
        assert_eq!(text.to_sql(SqlDialect::PostgreSql), "'O''Brien'");
        assert_eq!(text.to_sql(SqlDialect::MsSql), "N'O''Brien'");
        assert_eq!(ParamValue::from(r"a\b").to_sql(SqlDialect::MySql), r"'a\\b'");
        assert_eq!(ParamValue::from(true).to_sql(SqlDialect::Sqlite), "1");
        assert_eq!(ParamValue::from(false).to_sql(SqlDialect::DuckDb), "FALSE");
        assert_eq!(ParamValue::coerce(ParameterType::Number, "2.50").unwrap().to_sql(SqlDialect::Generic), "2.5");
        assert_eq!(ParamValue::Null.to_sql(SqlDialect::MySql), "NULL");
    }

    #[test]
    fn test_literal_text_has_no_quotes() {
        assert_eq!(ParamValue::from("O'Brien").to_literal_text(SqlDialect::MsSql), "O''Brien");
        assert_eq!(ParamValue::from(5).to_literal_text(SqlDialect::Generic), "5");
        assert_eq!(ParamValue::Null.to_literal_text(SqlDialect::Generic), "");
        let date = ParamValue::coerce(ParameterType::Date, "2024-03-01").unwrap();
        assert_eq!(date.to_literal_text(SqlDialect::PostgreSql), "2024-03-01");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&ParamValue::from(7)).unwrap();
        assert_eq!(json, r#"{"type":"number","value":7.0}"#);
        let parameter: QueryParameter = serde_json::from_str(r#"{"name":"id"}"#).unwrap();
        assert_eq!(parameter, QueryParameter::text("id"));
    }
}
