use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{
    Dialect, DuckDbDialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};

use crate::config::ConfigError;

/// Database family a query tab is attached to.
///
/// The dialect selects the grammar flavour handed to the SQL parser and the
/// literal rules used when `{{name}}` parameters are substituted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// Permissive ANSI-like grammar (default).
    #[default]
    Generic,
    /// PostgreSQL
    #[serde(alias = "postgres")]
    PostgreSql,
    /// MySQL / MariaDB
    MySql,
    /// SQLite
    Sqlite,
    /// Microsoft SQL Server
    #[serde(alias = "sqlserver")]
    MsSql,
    /// DuckDB
    DuckDb,
}

impl SqlDialect {
    pub fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::Generic => Box::new(GenericDialect {}),
            SqlDialect::PostgreSql => Box::new(PostgreSqlDialect {}),
            SqlDialect::MySql => Box::new(MySqlDialect {}),
            SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
            SqlDialect::MsSql => Box::new(MsSqlDialect {}),
            SqlDialect::DuckDb => Box::new(DuckDbDialect {}),
        }
    }

    /// Literal used for a boolean parameter value.
    pub fn boolean_literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (SqlDialect::Sqlite | SqlDialect::MsSql, true) => "1",
            (SqlDialect::Sqlite | SqlDialect::MsSql, false) => "0",
            (_, true) => "TRUE",
            (_, false) => "FALSE",
        }
    }

    /// Quote a text literal for this dialect.
    pub fn quote_text(&self, value: &str) -> String {
        let escaped = self.escape_text(value);
        match self {
            SqlDialect::MsSql => format!("N'{}'", escaped),
            _ => format!("'{}'", escaped),
        }
    }

    /// Escape text for use inside an already open single-quoted literal.
    pub fn escape_text(&self, value: &str) -> String {
        let escaped = value.replace('\'', "''");
        match self {
            SqlDialect::MySql => escaped.replace('\\', "\\\\"),
            _ => escaped,
        }
    }

    /// Quote a date or timestamp literal. Unicode prefixes never apply here.
    pub fn quote_temporal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SqlDialect::Generic => "generic",
            SqlDialect::PostgreSql => "postgresql",
            SqlDialect::MySql => "mysql",
            SqlDialect::Sqlite => "sqlite",
            SqlDialect::MsSql => "mssql",
            SqlDialect::DuckDb => "duckdb",
        }
    }
}

impl Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlDialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "" => Ok(SqlDialect::Generic),
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::PostgreSql),
            "mysql" | "mariadb" => Ok(SqlDialect::MySql),
            "sqlite" => Ok(SqlDialect::Sqlite),
            "mssql" | "sqlserver" => Ok(SqlDialect::MsSql),
            "duckdb" => Ok(SqlDialect::DuckDb),
            other => Err(ConfigError::UnknownDialect(other.to_string())),
        }
    }
}
