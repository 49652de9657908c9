//! File-backed tools: plain reads and the CSV/JSON query processors.

use super::Tool;
use crate::query::{csv_tool, json_tool};
use async_trait::async_trait;

/// Query a CSV file.
pub struct CsvProcessorTool;

#[async_trait]
impl Tool for CsvProcessorTool {
    fn name(&self) -> &str {
        "csv_processor"
    }

    fn description(&self) -> &str {
        "Process CSV files. Input should be a JSON string with 'path' (file path) and \
         'operation' ('read', 'head', 'describe', 'columns', 'list', or 'query'). \
         For 'list', include a 'column' parameter. For 'query', include a 'query' parameter \
         that is either a column name or a comparison such as 'age > 25' or \"name == 'Alice'\"."
    }

    async fn run(&self, input: &str) -> String {
        csv_tool(input)
    }
}

/// Query a JSON file with dot-paths.
pub struct JsonProcessorTool;

#[async_trait]
impl Tool for JsonProcessorTool {
    fn name(&self) -> &str {
        "json_processor"
    }

    fn description(&self) -> &str {
        "Process JSON files. Input should be a JSON string with 'path' (file path) and \
         'operation' ('read', 'keys', or 'query'). For 'query', include a 'query' parameter \
         with a dot notation path such as 'data.users.0.name'."
    }

    async fn run(&self, input: &str) -> String {
        json_tool(input)
    }
}

/// Read a text file from disk.
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a file from disk. Input should be the file path."
    }

    async fn run(&self, input: &str) -> String {
        let path = input.trim();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Error: no such file or directory: {}", path)
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello there").unwrap();
        let path = file.path().to_string_lossy().to_string();

        assert_eq!(ReadFileTool.run(&format!("  {}\n", path)).await, "hello there");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let text = ReadFileTool.run("/no/such/file.txt").await;
        assert_eq!(text, "Error: no such file or directory: /no/such/file.txt");
    }

    #[tokio::test]
    async fn test_csv_processor_delegates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Name,Age\nAlice,30\n").unwrap();
        let input = serde_json::json!({"path": file.path(), "operation": "columns"}).to_string();
        assert_eq!(CsvProcessorTool.run(&input).await, "Available columns: name, age");
    }
}
