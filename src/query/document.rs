//! Dot-path queries over JSON documents.

use super::error::{EvalResult, EvaluatorError};
use super::QueryRequest;
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const AVAILABLE_OPERATIONS: &str = "read, keys, query";

/// Operations understood by the document evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOperation {
    Read,
    Keys,
    Query,
}

impl FromStr for DocumentOperation {
    type Err = EvaluatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read" | "dump" => Ok(DocumentOperation::Read),
            "keys" => Ok(DocumentOperation::Keys),
            "query" => Ok(DocumentOperation::Query),
            _ => Err(EvaluatorError::UnknownOperation {
                operation: s.to_string(),
                available: AVAILABLE_OPERATIONS,
            }),
        }
    }
}

/// One step of a dot-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// All-digit segment: a zero-based sequence index.
    Index(usize),
    /// Anything else: a mapping key.
    Key(&'a str),
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str) -> Segment<'a> {
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = raw.parse() {
                return Segment::Index(index);
            }
        }
        Segment::Key(raw)
    }
}

/// Load the document named by the request and run the requested operation.
pub fn evaluate_document_request(request: &QueryRequest) -> EvalResult<String> {
    let path = Path::new(&request.path);
    if !path.is_file() {
        return Err(EvaluatorError::FileNotFound(request.path.clone()));
    }

    let operation: DocumentOperation = request.operation().parse()?;
    let content = std::fs::read_to_string(path).map_err(|e| EvaluatorError::parse("JSON", e))?;
    let document: Value =
        serde_json::from_str(&content).map_err(|e| EvaluatorError::parse("JSON", e))?;
    debug!("Running {:?} on {}", operation, request.path);

    match operation {
        DocumentOperation::Read => pretty(&document),
        DocumentOperation::Keys => root_keys(&document),
        DocumentOperation::Query => {
            let query = request
                .query
                .as_deref()
                .ok_or(EvaluatorError::MissingParameter("Query", "query"))?;
            pretty(resolve_path(&document, query)?)
        }
    }
}

/// Keys of a mapping root, as a pretty JSON array.
pub fn root_keys(document: &Value) -> EvalResult<String> {
    match document {
        Value::Object(map) => {
            let keys: Vec<&String> = map.keys().collect();
            serde_json::to_string_pretty(&keys).map_err(|e| EvaluatorError::parse("JSON", e))
        }
        _ => Err(EvaluatorError::NotAMapping),
    }
}

/// Walk a dot-separated path from the root of a document.
pub fn resolve_path<'v>(document: &'v Value, path: &str) -> EvalResult<&'v Value> {
    let mut current = document;
    let mut walked: Vec<&str> = Vec::new();

    for raw in path.split('.') {
        walked.push(raw);
        let at = walked.join(".");

        current = match (Segment::parse(raw), current) {
            (Segment::Index(index), Value::Array(items)) => {
                items.get(index).ok_or(EvaluatorError::IndexOutOfRange {
                    index,
                    len: items.len(),
                    path: at,
                })?
            }
            (Segment::Key(key), Value::Object(map)) => {
                map.get(key).ok_or_else(|| EvaluatorError::KeyNotFound {
                    key: key.to_string(),
                    path: at,
                })?
            }
            (Segment::Index(_), other) => {
                return Err(EvaluatorError::ShapeMismatch {
                    expected: "a list",
                    found: kind_of(other),
                    path: at,
                })
            }
            (Segment::Key(_), other) => {
                return Err(EvaluatorError::ShapeMismatch {
                    expected: "an object",
                    found: kind_of(other),
                    path: at,
                })
            }
        };
    }

    Ok(current)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn pretty(value: &Value) -> EvalResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| EvaluatorError::parse("JSON", e))
}
