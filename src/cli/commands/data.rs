//! Direct CSV and JSON queries, without the assistant.

use crate::query::{evaluate_document_request, evaluate_table_request, render_outcome, QueryRequest};
use anyhow::Result;

/// Run the csv command.
pub fn run_csv(
    path: &str,
    operation: &str,
    column: Option<String>,
    query: Option<String>,
) -> Result<()> {
    let request = QueryRequest {
        path: path.to_string(),
        operation: Some(operation.to_string()),
        column,
        query,
    };
    println!("{}", render_outcome(evaluate_table_request(&request)));
    Ok(())
}

/// Run the json command.
pub fn run_json(path: &str, operation: &str, query: Option<String>) -> Result<()> {
    let request = QueryRequest {
        path: path.to_string(),
        operation: Some(operation.to_string()),
        column: None,
        query,
    };
    println!("{}", render_outcome(evaluate_document_request(&request)));
    Ok(())
}
