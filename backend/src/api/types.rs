//! REST API types.
//!
//! Every successful expansion returns the rows as ordered JSON records plus
//! the requested rendering: CSV text for `csv`, headers and positional rows
//! for `json`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::OutputError;
use crate::output::{to_csv, to_json, to_records, OutputFormat};
use crate::parser::SourceFormat;
use crate::transform::pipeline::PipelineOutput;

/// Response sent after an expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandResponse {
    /// Unique job identifier, also tagged on streamed log entries
    pub job_id: String,

    /// Always "ok"; errors use [`error_response`]
    pub status: String,

    /// Column names in input order
    pub headers: Vec<String>,

    /// One object per row, keys in column order
    pub rows: Vec<Value>,

    /// CSV rendering, present when `format` is `csv`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,

    /// `{ headers, rows }` with positional rows, present when `format` is `json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Value>,

    pub metadata: ResponseMetadata,
}

/// Metadata about the expansion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub row_count: usize,
    pub column_count: usize,

    /// Nested columns, empty when nothing was nested
    pub nested: Vec<String>,

    /// "json" or "csv"
    pub source: String,

    /// Only set for CSV uploads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_info: Option<CsvMetadata>,
}

/// How an uploaded CSV was read
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
}

impl ExpandResponse {
    /// Build the response for a finished expansion.
    pub fn build(
        job_id: String,
        output: PipelineOutput,
        format: OutputFormat,
        delimiter: char,
    ) -> Result<Self, OutputError> {
        let (csv, table) = match format {
            OutputFormat::Csv => (Some(to_csv(&output.table, delimiter)?), None),
            OutputFormat::Json => (None, Some(to_json(&output.table))),
            OutputFormat::Records => (None, None),
        };

        let (source, csv_info) = match output.source {
            SourceFormat::Json => ("json".to_string(), None),
            SourceFormat::Csv { encoding, delimiter: read_with } => (
                "csv".to_string(),
                Some(CsvMetadata {
                    encoding,
                    delimiter: read_with.to_string(),
                }),
            ),
        };

        Ok(ExpandResponse {
            job_id,
            status: "ok".to_string(),
            headers: output.table.headers().to_vec(),
            rows: to_records(&output.table),
            csv,
            table,
            metadata: ResponseMetadata {
                row_count: output.table.len(),
                column_count: output.table.headers().len(),
                nested: output.nested,
                source,
                csv_info,
            },
        })
    }
}

/// Fresh job identifier.
pub fn new_job_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create an error response
pub fn error_response(job_id: &str, error: &str) -> Value {
    json!({
        "jobId": job_id,
        "status": "error",
        "error": error,
        "headers": [],
        "rows": [],
        "metadata": {
            "rowCount": 0,
            "columnCount": 0,
            "nested": []
        }
    })
}
