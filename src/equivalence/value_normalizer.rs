use crate::{format::is_numeric, model::FilterOperator};

/// Canonical spelling of filter values, so that text typed by a user and the
/// same value read back from SQL compare equal.
pub struct ValueNormalizer;

impl ValueNormalizer {
    pub fn normalize(operator: FilterOperator, value: &str) -> String {
        match operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => String::new(),
            FilterOperator::In | FilterOperator::NotIn => Self::list(value),
            FilterOperator::Between => Self::range(value),
            _ if is_numeric(value) => value.trim().to_string(),
            _ => value.to_string(),
        }
    }

    /// `1,2 ,  3` -> `1,2,3`
    pub fn list(value: &str) -> String {
        value.split(',')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Collapses whitespace and upper-cases the `AND` keyword.
    pub fn range(value: &str) -> String {
        value.split_whitespace()
            .map(|token| if token.eq_ignore_ascii_case("and") { "AND" } else { token })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_list_items_are_trimmed() {
        assert_eq!(ValueNormalizer::normalize(FilterOperator::In, "1,2 ,  3"), "1,2,3");
        assert_eq!(
            ValueNormalizer::normalize(FilterOperator::NotIn, "'a', 'b'"),
            ValueNormalizer::normalize(FilterOperator::NotIn, "'a','b'"),
        );
    }

    #[test]
    fn test_between_whitespace_and_keyword_case() {
        assert_eq!(ValueNormalizer::normalize(FilterOperator::Between, " 10  and\n20 "), "10 AND 20");
    }

    #[test]
    fn test_numbers_trimmed_strings_kept() {
        assert_eq!(ValueNormalizer::normalize(FilterOperator::Eq, " 42 "), "42");
        assert_eq!(ValueNormalizer::normalize(FilterOperator::Eq, " abc "), " abc ");
        assert_eq!(ValueNormalizer::normalize(FilterOperator::IsNull, "ignored"), "");
    }
}
