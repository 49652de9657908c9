//! In-memory table loaded from a delimited file.

use super::error::{EvalResult, EvaluatorError};
use super::value::{Value, ValueKey};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Cell contents read as missing, after trimming.
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// Parse a cell as a number. NaN spellings are missing, not numbers.
fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Rows of named scalar cells with normalized column names.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Normalize a column name: trimmed, spaces become underscores, lower-cased.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

impl Table {
    /// Build a table from already-typed parts. Rows shorter than the header
    /// are padded with nulls.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| normalize_column_name(c)).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Load a CSV file with a header row.
    pub fn from_path(path: &Path) -> EvalResult<Self> {
        let file = File::open(path).map_err(|e| EvaluatorError::parse("CSV", e))?;
        Self::from_reader(file)
    }

    /// Load CSV data with a header row from any reader.
    ///
    /// Empty cells and the usual missing-value markers (`NA`, `N/A`, `nan`,
    /// `null`, ...) are null. A column is numeric when every other cell parses
    /// as a float; otherwise its cells stay text.
    pub fn from_reader<R: Read>(reader: R) -> EvalResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| EvaluatorError::parse("CSV", e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| EvaluatorError::parse("CSV", e))?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            row.resize(headers.len(), String::new());
            raw_rows.push(row);
        }

        let numeric: Vec<bool> = (0..headers.len())
            .map(|col| {
                raw_rows
                    .iter()
                    .map(|row| row[col].trim())
                    .filter(|cell| !is_missing(cell))
                    .all(|cell| parse_number(cell).is_some())
            })
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&numeric)
                    .map(|(cell, &is_numeric)| {
                        let trimmed = cell.trim();
                        if is_missing(trimmed) {
                            Value::Null
                        } else if is_numeric {
                            parse_number(trimmed).map(Value::Number).unwrap_or(Value::Null)
                        } else {
                            Value::Text(cell)
                        }
                    })
                    .collect()
            })
            .collect::<Vec<Vec<Value>>>();

        debug!("Loaded table with {} columns and {} rows", headers.len(), rows.len());
        Ok(Self::new(headers, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column by (normalized) name.
    pub fn column_index(&self, name: &str) -> EvalResult<usize> {
        let wanted = normalize_column_name(name);
        self.columns
            .iter()
            .position(|c| *c == wanted)
            .ok_or_else(|| EvaluatorError::ColumnNotFound {
                column: wanted,
                available: self.columns.clone(),
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_ok()
    }

    /// Iterate over the cells of one column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Distinct non-null values of a column in order of first occurrence.
    pub fn unique_values(&self, index: usize) -> Vec<&Value> {
        self.value_counts(index).into_iter().map(|(value, _)| value).collect()
    }

    /// Distinct non-null values of a column with how often each occurs, in
    /// order of first occurrence.
    pub fn value_counts(&self, index: usize) -> Vec<(&Value, usize)> {
        let mut positions: HashMap<ValueKey<'_>, usize> = HashMap::new();
        let mut counts: Vec<(&Value, usize)> = Vec::new();
        for value in self.column_values(index) {
            let Some(key) = value.key() else {
                continue;
            };
            match positions.get(&key) {
                Some(&at) => counts[at].1 += 1,
                None => {
                    positions.insert(key, counts.len());
                    counts.push((value, 1));
                }
            }
        }
        counts
    }

    /// Whether every non-null cell of the column is a number.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        self.column_values(index)
            .all(|v| matches!(v, Value::Number(_) | Value::Null))
    }

    /// Render all rows.
    pub fn render(&self) -> String {
        self.render_rows(0..self.rows.len())
    }

    /// Render the first `n` rows.
    pub fn render_head(&self, n: usize) -> String {
        self.render_rows(0..n.min(self.rows.len()))
    }

    /// Render the rows at the given positions, labelled by their position in
    /// the full table.
    pub fn render_rows(&self, positions: impl IntoIterator<Item = usize>) -> String {
        let positions: Vec<usize> = positions.into_iter().collect();
        if positions.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.columns.join(", ")
            );
        }

        let index: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
        let cells: Vec<Vec<String>> = positions
            .iter()
            .map(|&p| self.rows[p].iter().map(|v| v.to_string()).collect())
            .collect();

        render_grid(&self.columns, &index, &cells)
    }
}

/// Lay out a labelled grid: a left-aligned index column followed by
/// right-aligned value columns separated by two spaces.
pub fn render_grid(headers: &[String], index: &[String], cells: &[Vec<String>]) -> String {
    let index_width = index.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            cells
                .iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 1);

    let mut header_line = " ".repeat(index_width);
    for (header, width) in headers.iter().zip(&widths) {
        header_line.push_str(&format!("  {:>width$}", header, width = width));
    }
    lines.push(header_line);

    for (label, row) in index.iter().zip(cells) {
        let mut line = format!("{:<width$}", label, width = index_width);
        for (cell, width) in row.iter().zip(&widths) {
            line.push_str(&format!("  {:>width$}", cell, width = width));
        }
        lines.push(line);
    }

    lines.join("\n")
}
