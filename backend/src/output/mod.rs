//! Render an expanded table for tabular consumers.
//!
//! # Formats
//!
//! | Format    | Shape                                                   |
//! |-----------|---------------------------------------------------------|
//! | `csv`     | header row, then one line per row                       |
//! | `json`    | `{ "headers": [...], "rows": [[...], ...] }`            |
//! | `records` | `[{ "make": "toyota", "buy": "best" }, ...]`            |
//!
//! CSV cells: strings are written as-is, `null` as an empty cell, anything
//! else as its JSON text.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::OutputError;
use crate::models::Table;

/// Output format for an expanded table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Records,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "records" => Ok(OutputFormat::Records),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write the table as CSV.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use expander::{expand, to_csv, Columns};
///
/// let columns = Columns::from_pairs(vec![
///     ("make", vec![json!("toyota")]),
///     ("year", vec![json!(2020), json!(2021)]),
/// ]).unwrap();
/// let table = expand(&columns, None::<&[&str]>).unwrap();
///
/// assert_eq!(to_csv(&table, ',').unwrap(), "make,year\ntoyota,2020\ntoyota,2021\n");
/// ```
pub fn to_csv(table: &Table<Value>, delimiter: char) -> Result<String, OutputError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(Vec::new());

    // csv writes an empty record as `""`
    if !table.headers().is_empty() {
        writer.write_record(table.headers())?;
    }
    for row in table.rows() {
        writer.write_record(row.iter().map(cell_text))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8(bytes)?)
}

/// One JSON object per row, keys in column order.
pub fn to_records(table: &Table<Value>) -> Vec<Value> {
    table
        .records()
        .map(|record| {
            let obj: Map<String, Value> = record
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
            Value::Object(obj)
        })
        .collect()
}

/// Headers plus positional rows.
pub fn to_json(table: &Table<Value>) -> Value {
    json!({
        "headers": table.headers(),
        "rows": table.rows(),
    })
}

/// Render a table in the requested format.
pub fn render(table: &Table<Value>, format: OutputFormat, delimiter: char) -> Result<String, OutputError> {
    match format {
        OutputFormat::Csv => to_csv(table, delimiter),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&to_json(table))?),
        OutputFormat::Records => Ok(serde_json::to_string_pretty(&to_records(table))?),
    }
}
