//! Tabular query evaluation over CSV files.

use super::describe::describe;
use super::error::{EvalResult, EvaluatorError};
use super::filter::{matching_rows, TableQuery};
use super::table::{normalize_column_name, Table};
use super::QueryRequest;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Number of rows shown by `head`.
const HEAD_ROWS: usize = 5;

const AVAILABLE_OPERATIONS: &str = "read, head, describe, columns, list, query";

/// Operations understood by the tabular evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOperation {
    Read,
    Head,
    Describe,
    Columns,
    List,
    Query,
}

impl FromStr for TableOperation {
    type Err = EvaluatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read" | "dump" => Ok(TableOperation::Read),
            "head" => Ok(TableOperation::Head),
            "describe" => Ok(TableOperation::Describe),
            "columns" => Ok(TableOperation::Columns),
            "list" => Ok(TableOperation::List),
            "query" => Ok(TableOperation::Query),
            _ => Err(EvaluatorError::UnknownOperation {
                operation: s.to_string(),
                available: AVAILABLE_OPERATIONS,
            }),
        }
    }
}

/// Load the table named by the request and run the requested operation.
pub fn evaluate_table_request(request: &QueryRequest) -> EvalResult<String> {
    let path = Path::new(&request.path);
    if !path.is_file() {
        return Err(EvaluatorError::FileNotFound(request.path.clone()));
    }

    let operation: TableOperation = request.operation().parse()?;
    let table = Table::from_path(path)?;
    debug!("Running {:?} on {}", operation, request.path);

    match operation {
        TableOperation::Read => Ok(table.render()),
        TableOperation::Head => Ok(table.render_head(HEAD_ROWS)),
        TableOperation::Describe => Ok(describe(&table)),
        TableOperation::Columns => Ok(list_columns(&table)),
        TableOperation::List => {
            let column = request
                .column
                .as_deref()
                .ok_or(EvaluatorError::MissingParameter("Column", "list"))?;
            list_values(&table, column)
        }
        TableOperation::Query => {
            let query = request
                .query
                .as_deref()
                .ok_or(EvaluatorError::MissingParameter("Query", "query"))?;
            run_query(&table, query)
        }
    }
}

/// `Available columns: a, b, c`.
pub fn list_columns(table: &Table) -> String {
    format!("Available columns: {}", table.columns().join(", "))
}

/// Distinct non-null values of a column, one `- value` line each.
pub fn list_values(table: &Table, column: &str) -> EvalResult<String> {
    let index = table.column_index(column)?;
    let name = normalize_column_name(column);

    let mut lines = vec![format!("Values in column '{}':", name)];
    lines.extend(
        table
            .unique_values(index)
            .into_iter()
            .map(|v| format!("- {}", v)),
    );
    Ok(lines.join("\n"))
}

/// Evaluate a free-form query expression.
pub fn run_query(table: &Table, expr: &str) -> EvalResult<String> {
    match TableQuery::parse(expr, table) {
        TableQuery::Column(column) => list_values(table, &column),
        TableQuery::Filter {
            column,
            op,
            literal,
        } => {
            let index = table.column_index(&column)?;
            let rows = matching_rows(table, index, op, &literal);
            debug!("Filter {} {} {:?} matched {} rows", column, op, literal, rows.len());

            if rows.is_empty() {
                Ok("No matching records found".to_string())
            } else {
                Ok(table.render_rows(rows))
            }
        }
        TableQuery::Unrecognized => Ok(usage_hint(table)),
    }
}

fn usage_hint(table: &Table) -> String {
    let example = table
        .columns()
        .first()
        .map(String::as_str)
        .unwrap_or("column");
    format!(
        "Invalid query format. Examples:\n\
         1. Column name (e.g., '{col}')\n\
         2. Comparison (e.g., '{col} > 10' or '{col} == \"value\"')",
        col = example
    )
}
