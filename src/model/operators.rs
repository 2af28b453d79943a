use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How a filter relates to the filter *before* it. The first filter's
/// connector is never emitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "NOT LIKE")]
    NotLike,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
    #[serde(rename = "BETWEEN")]
    Between,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "IS NOT NULL")]
    IsNotNull,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 13] = [
        FilterOperator::Eq,
        FilterOperator::NotEq,
        FilterOperator::Gt,
        FilterOperator::Lt,
        FilterOperator::GtEq,
        FilterOperator::LtEq,
        FilterOperator::Like,
        FilterOperator::NotLike,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::Between,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::GtEq => ">=",
            FilterOperator::LtEq => "<=",
            FilterOperator::Like => "LIKE",
            FilterOperator::NotLike => "NOT LIKE",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT IN",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::IsNull => "IS NULL",
            FilterOperator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Operators that take no right-hand value.
    pub fn is_unary(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    /// Operators whose right-hand side may be a nested SELECT.
    pub fn accepts_subquery(&self) -> bool {
        matches!(
            self,
            FilterOperator::Eq | FilterOperator::NotEq | FilterOperator::Gt | FilterOperator::Lt |
            FilterOperator::GtEq | FilterOperator::LtEq | FilterOperator::In | FilterOperator::NotIn
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();
        if normalized == "<>" {
            return Ok(FilterOperator::NotEq);
        }
        FilterOperator::ALL.iter()
            .find(|op| op.as_sql() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown filter operator '{}'", s))
    }
}

/// Comparison allowed in a HAVING condition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HavingOperator {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<=")]
    LtEq,
}

impl HavingOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            HavingOperator::Eq => "=",
            HavingOperator::NotEq => "!=",
            HavingOperator::Gt => ">",
            HavingOperator::Lt => "<",
            HavingOperator::GtEq => ">=",
            HavingOperator::LtEq => "<=",
        }
    }
}

impl fmt::Display for HavingOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl From<HavingOperator> for FilterOperator {
    fn from(op: HavingOperator) -> Self {
        match op {
            HavingOperator::Eq => FilterOperator::Eq,
            HavingOperator::NotEq => FilterOperator::NotEq,
            HavingOperator::Gt => FilterOperator::Gt,
            HavingOperator::Lt => FilterOperator::Lt,
            HavingOperator::GtEq => FilterOperator::GtEq,
            HavingOperator::LtEq => FilterOperator::LtEq,
        }
    }
}

impl TryFrom<FilterOperator> for HavingOperator {
    type Error = FilterOperator;

    fn try_from(op: FilterOperator) -> Result<Self, Self::Error> {
        match op {
            FilterOperator::Eq => Ok(HavingOperator::Eq),
            FilterOperator::NotEq => Ok(HavingOperator::NotEq),
            FilterOperator::Gt => Ok(HavingOperator::Gt),
            FilterOperator::Lt => Ok(HavingOperator::Lt),
            FilterOperator::GtEq => Ok(HavingOperator::GtEq),
            FilterOperator::LtEq => Ok(HavingOperator::LtEq),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_from_str() {
        assert_eq!("not   like".parse::<FilterOperator>().unwrap(), FilterOperator::NotLike);
        assert_eq!("<>".parse::<FilterOperator>().unwrap(), FilterOperator::NotEq);
        assert_eq!("IS NOT NULL".parse::<FilterOperator>().unwrap(), FilterOperator::IsNotNull);
        assert!("=~".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_operator_serializes_as_sql() {
        assert_eq!(serde_json::to_string(&FilterOperator::NotIn).unwrap(), "\"NOT IN\"");
        assert_eq!(serde_json::from_str::<FilterOperator>("\">=\"").unwrap(), FilterOperator::GtEq);
        assert_eq!(serde_json::to_string(&Connector::Or).unwrap(), "\"OR\"");
    }

    #[test]
    fn test_having_operator_conversion() {
        assert_eq!(HavingOperator::try_from(FilterOperator::Gt), Ok(HavingOperator::Gt));
        assert_eq!(HavingOperator::try_from(FilterOperator::Like), Err(FilterOperator::Like));
    }
}
