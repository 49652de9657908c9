//! Parsing of free-form tabular query expressions.

use super::table::{normalize_column_name, Table};
use super::value::{Comparison, Value};

/// A parsed tabular query.
#[derive(Debug, Clone, PartialEq)]
pub enum TableQuery {
    /// The expression names a column: list its distinct values.
    Column(String),
    /// `column <op> literal`.
    Filter {
        column: String,
        op: Comparison,
        literal: Value,
    },
    /// Neither a column name nor a comparison.
    Unrecognized,
}

impl TableQuery {
    /// Parse `expr` against the columns of `table`.
    ///
    /// The first operator found (in [`Comparison::PRECEDENCE`] order) must
    /// occur exactly once. A right-hand side that happens to name another
    /// column is still a literal.
    pub fn parse(expr: &str, table: &Table) -> TableQuery {
        let expr = expr.trim();
        let as_column = normalize_column_name(expr);
        if table.columns().contains(&as_column) {
            return TableQuery::Column(as_column);
        }

        let found = Comparison::PRECEDENCE
            .into_iter()
            .find(|op| expr.contains(op.symbol()));
        if let Some(op) = found {
            let mut parts = expr.split(op.symbol());
            if let (Some(left), Some(right), None) = (parts.next(), parts.next(), parts.next()) {
                return TableQuery::Filter {
                    column: normalize_column_name(left),
                    op,
                    literal: Value::parse_literal(right),
                };
            }
        }

        TableQuery::Unrecognized
    }
}

/// Positions of the rows for which `column <op> literal` holds.
pub fn matching_rows(table: &Table, column: usize, op: Comparison, literal: &Value) -> Vec<usize> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| op.holds(&row[column], literal))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_reader("Name,Age,First Name\nAlice,30,A\nBob,25,B\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_bare_column() {
        assert_eq!(
            TableQuery::parse("  AGE ", &table()),
            TableQuery::Column("age".to_string())
        );
        assert_eq!(
            TableQuery::parse("First Name", &table()),
            TableQuery::Column("first_name".to_string())
        );
    }

    #[test]
    fn test_operator_precedence() {
        match TableQuery::parse("age >= 26", &table()) {
            TableQuery::Filter { column, op, literal } => {
                assert_eq!(column, "age");
                assert_eq!(op, Comparison::GreaterOrEqual);
                assert_eq!(literal, Value::Number(26.0));
            }
            other => panic!("Expected filter, got {:?}", other),
        }

        match TableQuery::parse("age<=26", &table()) {
            TableQuery::Filter { op, .. } => assert_eq!(op, Comparison::LessOrEqual),
            other => panic!("Expected filter, got {:?}", other),
        }

        // Only the first operator found has to be unique
        match TableQuery::parse("age >= 3 > 2", &table()) {
            TableQuery::Filter { op, literal, .. } => {
                assert_eq!(op, Comparison::GreaterOrEqual);
                assert_eq!(literal, Value::Text("3 > 2".to_string()));
            }
            other => panic!("Expected filter, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_literal_keeps_case() {
        match TableQuery::parse("Name == 'Alice'", &table()) {
            TableQuery::Filter { column, op, literal } => {
                assert_eq!(column, "name");
                assert_eq!(op, Comparison::Equal);
                assert_eq!(literal, Value::Text("Alice".to_string()));
            }
            other => panic!("Expected filter, got {:?}", other),
        }
    }

    #[test]
    fn test_column_on_right_is_literal() {
        match TableQuery::parse("age > name", &table()) {
            TableQuery::Filter { literal, .. } => {
                assert_eq!(literal, Value::Text("name".to_string()))
            }
            other => panic!("Expected filter, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(TableQuery::parse("how old", &table()), TableQuery::Unrecognized);
        assert_eq!(TableQuery::parse("age != 3", &table()), TableQuery::Unrecognized);
        assert_eq!(TableQuery::parse("age > 3 > 2", &table()), TableQuery::Unrecognized);
        assert_eq!(TableQuery::parse("age == 3 == 3", &table()), TableQuery::Unrecognized);
    }

    #[test]
    fn test_matching_rows() {
        let t = table();
        assert_eq!(matching_rows(&t, 1, Comparison::Greater, &Value::Number(26.0)), vec![0]);
        assert!(matching_rows(&t, 1, Comparison::Greater, &Value::Number(99.0)).is_empty());
        // Numbers never equal text
        assert!(matching_rows(&t, 1, Comparison::Equal, &Value::Text("30".into())).is_empty());
    }
}
