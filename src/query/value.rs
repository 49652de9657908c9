//! Scalar cell values and comparison operators.

use std::cmp::Ordering;
use std::fmt;

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Null,
}

impl Value {
    /// Parse the right-hand side of a comparison.
    ///
    /// Quoted literals (single or double quotes) are always text, even when
    /// they look numeric. Anything else is a number if it parses as one and
    /// text otherwise.
    pub fn parse_literal(raw: &str) -> Value {
        let raw = raw.trim();
        for quote in ['\'', '"'] {
            if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
                return Value::Text(raw[1..raw.len() - 1].to_string());
            }
        }

        match raw.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Hashable identity used to find distinct values. Nulls have none.
    pub(crate) fn key(&self) -> Option<ValueKey<'_>> {
        match self {
            Value::Text(s) => Some(ValueKey::Text(s)),
            // 0.0 and -0.0 compare equal, so they share a key
            Value::Number(n) if *n == 0.0 => Some(ValueKey::Number(0.0f64.to_bits())),
            Value::Number(n) => Some(ValueKey::Number(n.to_bits())),
            Value::Null => None,
        }
    }

    /// Order two values of the same tag. Mixed tags and nulls have no order.
    fn partial_order(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        }
    }
}

/// Hash key for a non-null [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey<'a> {
    Text(&'a str),
    Number(u64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Null => write!(f, "NaN"),
        }
    }
}

/// Render a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Comparison operators, listed in the order they are searched for so that
/// `>=` is never split as `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    Greater,
    Less,
}

impl Comparison {
    pub const PRECEDENCE: [Comparison; 5] = [
        Comparison::GreaterOrEqual,
        Comparison::LessOrEqual,
        Comparison::Equal,
        Comparison::Greater,
        Comparison::Less,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
            Comparison::Equal => "==",
            Comparison::Greater => ">",
            Comparison::Less => "<",
        }
    }

    /// Whether `cell <op> literal` holds. Cells whose tag differs from the
    /// literal's never match.
    pub fn holds(self, cell: &Value, literal: &Value) -> bool {
        let Some(ordering) = cell.partial_order(literal) else {
            return false;
        };
        match self {
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::Greater => ordering == Ordering::Greater,
            Comparison::Less => ordering == Ordering::Less,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("26"), Value::Number(26.0));
        assert_eq!(Value::parse_literal(" 2.5 "), Value::Number(2.5));
        assert_eq!(Value::parse_literal("'30'"), Value::Text("30".to_string()));
        assert_eq!(Value::parse_literal("\"Alice\""), Value::Text("Alice".to_string()));
        assert_eq!(Value::parse_literal("bob"), Value::Text("bob".to_string()));
        // Mismatched quotes are not stripped
        assert_eq!(Value::parse_literal("'bob\""), Value::Text("'bob\"".to_string()));
    }

    #[test]
    fn test_comparison_by_tag() {
        let thirty = Value::Number(30.0);
        assert!(Comparison::Greater.holds(&thirty, &Value::Number(26.0)));
        assert!(Comparison::GreaterOrEqual.holds(&thirty, &Value::Number(30.0)));
        assert!(!Comparison::Less.holds(&thirty, &Value::Number(30.0)));

        let text = Value::Text("30".to_string());
        assert!(!Comparison::Equal.holds(&text, &Value::Number(30.0)));
        assert!(Comparison::Equal.holds(&text, &Value::Text("30".to_string())));
        assert!(Comparison::Less.holds(&Value::Text("alice".into()), &Value::Text("bob".into())));

        assert!(!Comparison::Equal.holds(&Value::Null, &Value::Null));
    }

    #[test]
    fn test_value_keys() {
        assert_eq!(Value::Number(0.0).key(), Value::Number(-0.0).key());
        assert_ne!(Value::Number(1.0).key(), Value::Text("1".into()).key());
        assert!(Value::Null.key().is_none());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-4.0), "-4");
    }
}
