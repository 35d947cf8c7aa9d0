//! High-level pipeline API: load → validate → plan → expand.
//!
//! # Example
//!
//! ```rust,ignore
//! use expander::{expand_file, ExpandOptions, render, OutputFormat};
//! use std::path::Path;
//!
//! let output = expand_file(Path::new("keywords.json"), ExpandOptions::default())?;
//! println!("{}", render(&output.table, OutputFormat::Csv, ',')?);
//! ```

use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

use super::expander::plan;
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::config::DEFAULT_MAX_ROWS;
use crate::error::PipelineError;
use crate::models::Table;
use crate::parser::{parse_grid_bytes, parse_grid_file, parse_grid_value, GridRequest, ParseResult, SourceFormat};
use crate::validation::validate_grid_request;

/// Options for the expansion pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Replaces the nesting given by the document, if any
    pub nesting: Option<Vec<String>>,

    /// Refuse expansions above this many rows; `None` = unlimited
    pub max_rows: Option<usize>,

    /// Skip JSON schema validation of the document
    pub skip_validation: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            nesting: None,
            max_rows: Some(DEFAULT_MAX_ROWS),
            skip_validation: false,
        }
    }
}

/// Result of a complete expansion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub table: Table<Value>,

    /// How the input was read
    pub source: SourceFormat,

    /// Nested columns, in column order
    pub nested: Vec<String>,
}

/// Expand a JSON or CSV file.
pub fn expand_file(path: &Path, options: ExpandOptions) -> Result<PipelineOutput, PipelineError> {
    log_info(format!("📄 Reading {}...", path.display()));
    let parsed = parse_grid_file(path)?;
    expand_parsed(parsed, options)
}

/// Expand raw JSON or CSV bytes.
pub fn expand_bytes(bytes: &[u8], options: ExpandOptions) -> Result<PipelineOutput, PipelineError> {
    log_info(format!("📄 Reading {} bytes...", bytes.len()));
    let parsed = parse_grid_bytes(bytes)?;
    expand_parsed(parsed, options)
}

/// Expand an already decoded JSON document.
pub fn expand_document(document: &Value, options: ExpandOptions) -> Result<PipelineOutput, PipelineError> {
    let request = parse_grid_value(document).map_err(|e| {
        // Prefer the schema's explanation when the shape is wrong
        match (options.skip_validation, validate_grid_request(document)) {
            (false, Err(errors)) => PipelineError::Validation(errors),
            _ => PipelineError::from(e),
        }
    })?;
    expand_parsed(
        ParseResult {
            request,
            format: SourceFormat::Json,
            document: Some(document.clone()),
        },
        options,
    )
}

fn expand_parsed(parsed: ParseResult, options: ExpandOptions) -> Result<PipelineOutput, PipelineError> {
    match &parsed.format {
        SourceFormat::Json => log_success("Detected JSON grid"),
        SourceFormat::Csv { encoding, delimiter } => {
            log_success(format!("Detected CSV grid ({}, separator '{}')", encoding, format_delimiter(*delimiter)));
        }
    }

    if let Some(ref document) = parsed.document {
        if options.skip_validation {
            log_info("(validation skipped)");
        } else {
            log_info("✔️  Validating document...");
            validate_grid_request(document).map_err(PipelineError::Validation)?;
            log_success("Document matches grid schema");
        }
    }

    let ParseResult { request, format, .. } = parsed;
    let GridRequest { columns, nesting } = request;
    let nesting = options.nesting.or(nesting);

    log_info(format!("📋 {} columns:", columns.len()));
    for column in &columns {
        log_info_indent(format!("{} ({} values)", column.name, column.len()), 1);
    }

    let plan = plan(&columns, nesting.as_deref())?;
    if plan.is_nested() {
        log_info(format!("🔗 Nested group: [{}]", plan.nested().join(", ")));
    }

    let rows = plan.row_count();
    if let Some(limit) = options.max_rows {
        if rows > limit {
            log_warning(format!("{} rows exceeds the limit of {}", rows, limit));
            return Err(PipelineError::RowLimitExceeded { rows, limit });
        }
    }

    log_info("⚙️  Expanding...");
    let table = plan.to_table();
    let nested = plan.nested().to_vec();
    log_success(format!("Generated {} rows", table.len()));

    Ok(PipelineOutput {
        table,
        source: format,
        nested,
    })
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

/// The car keyword example: makes paired with their models, crossed with
/// purchase-intent words.
pub fn example_request() -> Value {
    json!({
        "columns": {
            "make": ["toyota", "toyota", "ford", "ford"],
            "model": ["yaris", "camry", "mustang", "focus"],
            "buy": ["buy", "best", "price"]
        },
        "nesting": ["make", "model"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExpandError, GridError};
    use std::io::Write;

    #[test]
    fn test_default_options() {
        let opts = ExpandOptions::default();
        assert_eq!(opts.max_rows, Some(DEFAULT_MAX_ROWS));
        assert!(opts.nesting.is_none());
        assert!(!opts.skip_validation);
    }

    #[test]
    fn test_example_request() {
        let output = expand_document(&example_request(), ExpandOptions::default()).unwrap();

        assert_eq!(output.table.len(), 12);
        assert_eq!(output.nested, vec!["make", "model"]);
        assert_eq!(output.table.rows()[6], vec![json!("ford"), json!("mustang"), json!("buy")]);
    }

    #[test]
    fn test_option_nesting_overrides_document() {
        let options = ExpandOptions {
            nesting: Some(vec![]),
            ..ExpandOptions::default()
        };
        let output = expand_document(&example_request(), options).unwrap();
        assert_eq!(output.table.len(), 48);
        assert!(output.nested.is_empty());
    }

    #[test]
    fn test_row_limit() {
        let options = ExpandOptions {
            max_rows: Some(10),
            ..ExpandOptions::default()
        };
        let err = expand_document(&example_request(), options).unwrap_err();
        assert!(matches!(err, PipelineError::RowLimitExceeded { rows: 12, limit: 10 }));
    }

    #[test]
    fn test_length_mismatch_propagates() {
        let document = json!({
            "columns": { "make": ["toyota", "ford"], "model": ["yaris", "camry", "focus"] },
            "nesting": ["make", "model"]
        });
        let err = expand_document(&document, ExpandOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Expand(ExpandError::NestingLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_schema_errors_reported() {
        let err = expand_document(&json!({ "make": "toyota" }), ExpandOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        let options = ExpandOptions {
            skip_validation: true,
            ..ExpandOptions::default()
        };
        let err = expand_document(&json!({ "make": "toyota" }), options).unwrap_err();
        assert!(matches!(err, PipelineError::Grid(GridError::Invalid(_))));
    }

    #[test]
    fn test_non_object_bytes_fail() {
        let err = expand_bytes(br#"["make", "model"]"#, ExpandOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Grid(GridError::Invalid(ExpandError::InvalidInputType { .. }))
        ));
    }

    #[test]
    fn test_stray_request_key_not_dropped() {
        let document = json!({ "columns": { "a": [1, 2] }, "b": [3] });
        let options = ExpandOptions {
            skip_validation: true,
            ..ExpandOptions::default()
        };
        let err = expand_document(&document, options).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Grid(GridError::Invalid(ExpandError::InvalidInputType { .. }))
        ));
    }

    #[test]
    fn test_duplicate_nesting_caught_by_schema() {
        let document = json!({ "columns": { "a": [1] }, "nesting": ["a", "a"] });
        let err = expand_document(&document, ExpandOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_csv_bytes() {
        let csv = "make,model,buy\ntoyota,yaris,buy\nford,focus,best\n,,price\n";
        let options = ExpandOptions {
            nesting: Some(vec!["model".into(), "make".into()]),
            ..ExpandOptions::default()
        };
        let output = expand_bytes(csv.as_bytes(), options).unwrap();

        assert_eq!(output.table.headers(), &["make", "model", "buy"]);
        assert_eq!(output.table.len(), 6);
        assert!(matches!(output.source, SourceFormat::Csv { delimiter: ',', .. }));
    }

    #[test]
    fn test_expand_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", example_request()).unwrap();

        let output = expand_file(file.path(), ExpandOptions::default()).unwrap();
        assert_eq!(output.table.len(), 12);
        assert_eq!(output.source, SourceFormat::Json);
    }
}
