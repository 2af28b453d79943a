use sqlparser::ast::{Expr, UnaryOperator, Value};

use crate::{
    format::quote_string,
    model::ParsedQuery,
    parser::{ColumnResolver, TemplateMask, TranslationContext},
};

/// Turns right-hand sides of predicates into the text stored in filter
/// values.
pub struct LiteralResolver;

impl LiteralResolver {
    /// Value as the user would type it into a filter: strings unquoted,
    /// numbers and placeholders verbatim, column references qualified.
    pub fn value_text(expr: &Expr, query: &ParsedQuery, ctx: &TranslationContext) -> Option<String> {
        let text = match expr {
            Expr::Value(value) => Self::raw_value(value),
            Expr::UnaryOp { op, expr } => Self::signed_number(op, expr),
            Expr::Nested(inner) => return Self::value_text(inner, query, ctx),
            Expr::Identifier(ident) => TemplateMask::placeholder(&ident.value)
                .or_else(|| ColumnResolver::qualified(expr, query, ctx)),
            Expr::CompoundIdentifier(_) => ColumnResolver::qualified(expr, query, ctx),
            _ => None,
        };
        text.map(|t| TemplateMask::unmask(&t))
    }

    /// Value spelled as SQL, for IN lists and BETWEEN bounds which are kept
    /// as SQL fragments.
    pub fn sql_text(expr: &Expr, query: &ParsedQuery, ctx: &TranslationContext) -> Option<String> {
        let text = match expr {
            Expr::Value(Value::SingleQuotedString(s)) |
            Expr::Value(Value::DoubleQuotedString(s)) |
            Expr::Value(Value::NationalStringLiteral(s)) => Some(quote_string(s)),
            Expr::Value(Value::Boolean(b)) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Expr::Value(value) => Self::raw_value(value),
            Expr::UnaryOp { op, expr } => Self::signed_number(op, expr),
            Expr::Nested(inner) => return Self::sql_text(inner, query, ctx),
            Expr::Identifier(ident) => TemplateMask::placeholder(&ident.value)
                .or_else(|| ColumnResolver::qualified(expr, query, ctx)),
            Expr::CompoundIdentifier(_) => ColumnResolver::qualified(expr, query, ctx),
            _ => None,
        };
        text.map(|t| TemplateMask::unmask(&t))
    }

    fn raw_value(value: &Value) -> Option<String> {
        match value {
            Value::Number(n, _) => Some(n.clone()),
            Value::SingleQuotedString(s) |
            Value::DoubleQuotedString(s) |
            Value::NationalStringLiteral(s) => Some(s.clone()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null => Some("NULL".to_string()),
            Value::Placeholder(p) => Some(p.clone()),
            _ => None,
        }
    }

    fn signed_number(op: &UnaryOperator, expr: &Expr) -> Option<String> {
        let Expr::Value(Value::Number(n, _)) = expr else {
            return None;
        };
        match op {
            UnaryOperator::Minus => Some(format!("-{}", n)),
            UnaryOperator::Plus => Some(n.clone()),
            _ => None,
        }
    }
}
