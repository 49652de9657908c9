//! Summary statistics in the shape of a dataframe `describe()`.

use super::table::{render_grid, Table};
use super::value::Value;

const NUMERIC_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
const TEXT_ROWS: [&str; 4] = ["count", "unique", "top", "freq"];

/// Summarize the numeric columns of a table, or its text columns when there
/// are no numeric ones.
pub fn describe(table: &Table) -> String {
    let numeric: Vec<usize> = (0..table.columns().len())
        .filter(|&i| table.is_numeric_column(i))
        .collect();

    if numeric.is_empty() {
        describe_text(table)
    } else {
        describe_numeric(table, &numeric)
    }
}

fn describe_numeric(table: &Table, columns: &[usize]) -> String {
    let headers: Vec<String> = columns.iter().map(|&i| table.columns()[i].clone()).collect();
    let stats: Vec<[f64; 8]> = columns
        .iter()
        .map(|&i| {
            let values: Vec<f64> = table.column_values(i).filter_map(Value::as_number).collect();
            numeric_summary(&values)
        })
        .collect();

    let cells: Vec<Vec<String>> = (0..NUMERIC_ROWS.len())
        .map(|row| stats.iter().map(|s| format_stat(s[row])).collect())
        .collect();
    let index: Vec<String> = NUMERIC_ROWS.iter().map(|s| s.to_string()).collect();

    render_grid(&headers, &index, &cells)
}

fn describe_text(table: &Table) -> String {
    if table.columns().is_empty() {
        return "Empty DataFrame\nColumns: []\nIndex: []".to_string();
    }

    let summaries: Vec<[String; 4]> = (0..table.columns().len())
        .map(|i| {
            let counts = table.value_counts(i);
            let present: usize = counts.iter().map(|(_, n)| n).sum();
            // Ties go to the value seen first
            let top = counts.iter().fold(None::<(&Value, usize)>, |best, &(value, count)| {
                match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((value, count)),
                }
            });

            match top {
                Some((value, freq)) => [
                    present.to_string(),
                    counts.len().to_string(),
                    value.to_string(),
                    freq.to_string(),
                ],
                None => [
                    "0".to_string(),
                    "0".to_string(),
                    "NaN".to_string(),
                    "NaN".to_string(),
                ],
            }
        })
        .collect();

    let cells: Vec<Vec<String>> = (0..TEXT_ROWS.len())
        .map(|row| summaries.iter().map(|s| s[row].clone()).collect())
        .collect();
    let index: Vec<String> = TEXT_ROWS.iter().map(|s| s.to_string()).collect();

    render_grid(table.columns(), &index, &cells)
}

/// count, mean, std, min, 25%, 50%, 75%, max. Undefined statistics are NaN.
fn numeric_summary(values: &[f64]) -> [f64; 8] {
    if values.is_empty() {
        return [0.0, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN];
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let std = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1.0)).sqrt()
    } else {
        f64::NAN
    };

    [
        count,
        mean,
        std,
        sorted[0],
        percentile(&sorted, 25.0),
        percentile(&sorted, 50.0),
        percentile(&sorted, 75.0),
        sorted[sorted.len() - 1],
    ]
}

/// Linear-interpolated percentile of non-empty sorted data.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let data = [25.0, 30.0];
        assert_eq!(percentile(&data, 25.0), 26.25);
        assert_eq!(percentile(&data, 50.0), 27.5);
        assert_eq!(percentile(&data, 75.0), 28.75);
    }

    #[test]
    fn test_numeric_summary() {
        let stats = numeric_summary(&[30.0, 25.0]);
        assert_eq!(stats[0], 2.0);
        assert_eq!(stats[1], 27.5);
        assert!((stats[2] - 3.535534).abs() < 1e-6);
        assert_eq!(stats[3], 25.0);
        assert_eq!(stats[7], 30.0);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let stats = numeric_summary(&[4.0]);
        assert!(stats[2].is_nan());
    }

    #[test]
    fn test_describe_skips_text_columns() {
        let table = Table::from_reader("Name,Age\nAlice,30\nBob,25\n".as_bytes()).unwrap();
        let text = describe(&table);
        assert!(text.contains("age"));
        assert!(!text.contains("name"));
        assert!(text.contains("27.500000"));
        assert!(text.lines().any(|l| l.starts_with("std") && l.contains("3.535534")));
    }

    #[test]
    fn test_describe_text_only_table() {
        let table = Table::from_reader("city\nOslo\nBergen\nOslo\n".as_bytes()).unwrap();
        let text = describe(&table);
        let top = text.lines().find(|l| l.starts_with("top")).unwrap();
        assert!(top.ends_with("Oslo"));
        let freq = text.lines().find(|l| l.starts_with("freq")).unwrap();
        assert!(freq.ends_with('2'));
    }
}
