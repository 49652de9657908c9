//! Ad-hoc query evaluation over CSV tables and JSON documents.
//!
//! Both evaluators take a JSON request naming a file and an operation, load
//! the file fresh, and answer with plain text. Failures are typed internally
//! ([`EvaluatorError`]) and rendered as `Error ...` text at the boundary, so
//! callers always get something an LLM can read.
//!
//! Tabular operations: `read`, `head`, `describe`, `columns`, `list`, `query`.
//! Queries are either a bare column name or `column <op> literal` with
//! `>=`, `<=`, `==`, `>` or `<`.
//!
//! Document operations: `read`, `keys`, `query` (dot-path such as
//! `data.users.0.name`).

mod describe;
mod document;
mod error;
mod filter;
mod table;
mod tabular;
mod value;

pub use document::{evaluate_document_request, resolve_path, root_keys, DocumentOperation, Segment};
pub use error::{render_outcome, EvalResult, EvaluatorError};
pub use filter::TableQuery;
pub use table::{normalize_column_name, Table};
pub use tabular::{evaluate_table_request, list_columns, list_values, run_query, TableOperation};
pub use value::{Comparison, Value};

use serde::Deserialize;

/// Request accepted by the CSV and JSON tools.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub path: String,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl QueryRequest {
    /// Parse a request from the tool's JSON input.
    pub fn parse(input: &str, source_kind: &'static str) -> EvalResult<Self> {
        serde_json::from_str(input.trim()).map_err(|e| EvaluatorError::parse(source_kind, e))
    }

    /// Requested operation, `read` when absent.
    pub fn operation(&self) -> &str {
        self.operation.as_deref().unwrap_or("read")
    }
}

/// Evaluate a CSV tool input and render the outcome as text.
pub fn csv_tool(input: &str) -> String {
    render_outcome(QueryRequest::parse(input, "CSV").and_then(|r| evaluate_table_request(&r)))
}

/// Evaluate a JSON tool input and render the outcome as text.
pub fn json_tool(input: &str) -> String {
    render_outcome(
        QueryRequest::parse(input, "JSON").and_then(|r| evaluate_document_request(&r)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn csv_input(file: &NamedTempFile, extra: serde_json::Value) -> String {
        let mut request = serde_json::json!({ "path": file.path() });
        if let (Some(obj), Some(extra)) = (request.as_object_mut(), extra.as_object()) {
            obj.extend(extra.clone());
        }
        request.to_string()
    }

    #[test]
    fn test_csv_end_to_end() {
        let file = write_temp("Name,Age\nAlice,30\nBob,25\n", ".csv");

        let filtered = csv_tool(&csv_input(
            &file,
            serde_json::json!({"operation": "query", "query": "age > 26"}),
        ));
        assert!(filtered.contains("Alice"));
        assert!(!filtered.contains("Bob"));

        let listed = csv_tool(&csv_input(
            &file,
            serde_json::json!({"operation": "query", "query": "age"}),
        ));
        assert!(listed.ends_with("- 30\n- 25"));

        let columns = csv_tool(&csv_input(&file, serde_json::json!({"operation": "columns"})));
        assert_eq!(columns, "Available columns: name, age");
    }

    #[test]
    fn test_csv_defaults_to_read() {
        let file = write_temp("Name,Age\nAlice,30\n", ".csv");
        let text = csv_tool(&csv_input(&file, serde_json::json!({})));
        assert!(text.contains("Alice"));
    }

    #[test]
    fn test_csv_list_absent_column() {
        let file = write_temp("Name,Age\nAlice,30\n", ".csv");
        let text = csv_tool(&csv_input(
            &file,
            serde_json::json!({"operation": "list", "column": "Salary"}),
        ));
        assert!(text.starts_with("Error"));
        assert!(text.contains("not found"));
        assert!(text.contains("name, age"));
    }

    #[test]
    fn test_malformed_input_is_text() {
        let text = csv_tool("not json at all");
        assert!(text.starts_with("Error processing CSV"));
        let text = json_tool(r#"{"operation": "keys"}"#);
        assert!(text.starts_with("Error processing JSON"));
    }

    #[test]
    fn test_json_end_to_end() {
        let file = write_temp(r#"{"a": {"b": [10, 20, 30]}}"#, ".json");
        let input = |query: &str| {
            serde_json::json!({"path": file.path(), "operation": "query", "query": query})
                .to_string()
        };

        assert_eq!(json_tool(&input("a.b.1")), "20");
        assert!(json_tool(&input("a.b.5")).contains("out of range"));
        assert!(json_tool(&input("a.c")).contains("not found"));
    }

    #[test]
    fn test_json_unknown_operation() {
        let file = write_temp("[]", ".json");
        let text = json_tool(
            &serde_json::json!({"path": file.path(), "operation": "flatten"}).to_string(),
        );
        assert!(text.starts_with("Error: Unknown operation flatten"));
    }
}
