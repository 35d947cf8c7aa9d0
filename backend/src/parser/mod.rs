//! Load expansion input from JSON or CSV documents.
//!
//! Two JSON shapes are accepted:
//!
//! ```json
//! { "make": ["toyota", "ford"], "buy": ["buy", "best"] }
//! ```
//!
//! ```json
//! { "columns": { "make": ["toyota", "ford"] }, "nesting": ["make"] }
//! ```
//!
//! CSV input has one column per header. Empty cells are skipped, so columns
//! may have different lengths. Encoding and delimiter are auto-detected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{ExpandError, GridError};
use crate::models::Columns;

/// Columns plus the nesting requested by the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRequest {
    pub columns: Columns<Value>,
    pub nesting: Option<Vec<String>>,
}

/// Metadata about how a document was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFormat {
    Json,
    Csv { encoding: String, delimiter: char },
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub request: GridRequest,
    pub format: SourceFormat,
    /// The JSON document as read, for schema validation. `None` for CSV.
    pub document: Option<Value>,
}

// =============================================================================
// JSON
// =============================================================================

/// Read a JSON grid or grid request.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use expander::parse_grid_value;
///
/// let request = parse_grid_value(&json!({
///     "columns": { "make": ["toyota"], "model": ["yaris"] },
///     "nesting": ["make", "model"]
/// })).unwrap();
///
/// assert_eq!(request.columns.names(), vec!["make", "model"]);
/// assert_eq!(request.nesting.unwrap().len(), 2);
/// ```
pub fn parse_grid_value(value: &Value) -> Result<GridRequest, GridError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid_type("an object of columns", value))?;

    match obj.get("columns") {
        Some(Value::Object(columns)) => {
            if let Some(stray) = obj.keys().find(|k| !REQUEST_KEYS.contains(&k.as_str())) {
                return Err(ExpandError::InvalidInputType {
                    expected: "only 'nesting' and 'format' beside 'columns'".to_string(),
                    found: format!("key '{}'", stray),
                }
                .into());
            }
            let nesting = match obj.get("nesting") {
                None | Some(Value::Null) => None,
                Some(Value::Array(names)) => Some(nesting_names(names)?),
                Some(other) => return Err(invalid_type("a list of column names", other).into()),
            };
            Ok(GridRequest {
                columns: columns_from_map(columns)?,
                nesting,
            })
        }
        _ => Ok(GridRequest {
            columns: columns_from_map(obj)?,
            nesting: None,
        }),
    }
}

const REQUEST_KEYS: [&str; 3] = ["columns", "nesting", "format"];

/// Parse a JSON string into a grid request.
pub fn parse_grid_json(content: &str) -> Result<GridRequest, GridError> {
    let value: Value = serde_json::from_str(content)?;
    parse_grid_value(&value)
}

fn columns_from_map(map: &Map<String, Value>) -> Result<Columns<Value>, ExpandError> {
    let mut columns = Columns::new();
    for (name, values) in map {
        let values = values
            .as_array()
            .ok_or_else(|| invalid_type(&format!("a list of values for column '{}'", name), values))?;
        columns.push(name.clone(), values.clone())?;
    }
    Ok(columns)
}

fn nesting_names(names: &[Value]) -> Result<Vec<String>, ExpandError> {
    names
        .iter()
        .map(|n| {
            n.as_str()
                .map(String::from)
                .ok_or_else(|| invalid_type("a column name", n))
        })
        .collect()
}

fn invalid_type(expected: &str, found: &Value) -> ExpandError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ExpandError::InvalidInputType {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

static NAME_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;\s]+").expect("static regex"));

/// Split a nesting list such as `"make, model"` or `"make;model"`.
pub fn parse_nesting_list(list: &str) -> Vec<String> {
    NAME_SEPARATORS
        .split(list.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// =============================================================================
// CSV
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        // chardet reports nothing for empty or very short input
        "" => "utf-8".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> Result<String, GridError> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => return Err(GridError::Encoding(format!("unsupported encoding '{}'", other))),
        },
    };
    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read columns from CSV text with an explicit delimiter.
///
/// Each header names one column; values are read top to bottom and empty
/// cells are skipped.
///
/// # Example
/// ```rust
/// use expander::parse_grid_csv;
///
/// let columns = parse_grid_csv("make,buy\ntoyota,buy\nford,best\n,price", ',').unwrap();
/// assert_eq!(columns.get("make").unwrap().len(), 2);
/// assert_eq!(columns.get("buy").unwrap().len(), 3);
/// ```
pub fn parse_grid_csv(content: &str, delimiter: char) -> Result<Columns<Value>, GridError> {
    if content.trim().is_empty() {
        return Err(GridError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(GridError::NoHeaders);
    }

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, cell) in record.iter().enumerate().take(headers.len()) {
            if !cell.is_empty() {
                values[i].push(Value::String(cell.to_string()));
            }
        }
    }

    let columns = Columns::from_pairs(headers.into_iter().zip(values))?;
    Ok(columns)
}

// =============================================================================
// Auto-detection
// =============================================================================

/// Parse bytes as JSON when they hold a JSON document, otherwise as CSV.
///
/// Content starting with `{` must be valid JSON. Any other content that
/// parses as JSON (arrays, strings, scalars) is still read as JSON, so a
/// non-object root is reported instead of being read as CSV headers.
pub fn parse_grid_bytes(bytes: &[u8]) -> Result<ParseResult, GridError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(GridError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    let document: Option<Value> = if content.trim_start().starts_with('{') {
        Some(serde_json::from_str(&content)?)
    } else {
        serde_json::from_str(&content).ok()
    };

    if let Some(document) = document {
        let request = parse_grid_value(&document)?;
        return Ok(ParseResult {
            request,
            format: SourceFormat::Json,
            document: Some(document),
        });
    }

    let delimiter = detect_delimiter(&content);
    let columns = parse_grid_csv(&content, delimiter)?;
    Ok(ParseResult {
        request: GridRequest {
            columns,
            nesting: None,
        },
        format: SourceFormat::Csv { encoding, delimiter },
        document: None,
    })
}

/// Parse a JSON or CSV file with auto-detection.
pub fn parse_grid_file<P: AsRef<Path>>(path: P) -> Result<ParseResult, GridError> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_grid_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_bare_grid_keeps_key_order() {
        let request = parse_grid_json(r#"{"zeta": [1], "alpha": [2, 3], "mid": ["x"]}"#).unwrap();

        assert_eq!(request.columns.names(), vec!["zeta", "alpha", "mid"]);
        assert!(request.nesting.is_none());
    }

    #[test]
    fn test_request_with_nesting() {
        let request = parse_grid_value(&json!({
            "columns": {
                "make": ["toyota", "ford"],
                "model": ["yaris", "focus"],
                "buy": ["buy"]
            },
            "nesting": ["make", "model"]
        }))
        .unwrap();

        assert_eq!(request.columns.len(), 3);
        assert_eq!(request.nesting, Some(vec!["make".to_string(), "model".to_string()]));
    }

    #[test]
    fn test_heterogeneous_values_kept() {
        let request = parse_grid_value(&json!({ "mixed": [1, "two", true, null, {"k": 1}] })).unwrap();
        assert_eq!(request.columns.get("mixed").unwrap().len(), 5);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_grid_value(&json!(["make", "model"])).unwrap_err();
        assert!(matches!(
            err,
            GridError::Invalid(ExpandError::InvalidInputType { ref found, .. }) if found == "array"
        ));
    }

    #[test]
    fn test_non_object_bytes_rejected() {
        let cases: [&[u8]; 4] = [b"[1,2]", br#""x""#, br#"["make", "model"]"#, b"42"];
        for bytes in cases {
            let err = parse_grid_bytes(bytes).unwrap_err();
            assert!(
                matches!(err, GridError::Invalid(ExpandError::InvalidInputType { .. })),
                "{:?} gave {:?}",
                String::from_utf8_lossy(bytes),
                err
            );
        }
    }

    #[test]
    fn test_non_object_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["make", "model"]"#).unwrap();

        let err = parse_grid_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            GridError::Invalid(ExpandError::InvalidInputType { ref found, .. }) if found == "array"
        ));
    }

    #[test]
    fn test_request_with_stray_key_rejected() {
        let err = parse_grid_value(&json!({ "columns": { "a": [1] }, "b": [1] })).unwrap_err();
        assert!(matches!(
            err,
            GridError::Invalid(ExpandError::InvalidInputType { ref found, .. }) if found == "key 'b'"
        ));

        let request = parse_grid_value(&json!({ "columns": { "a": [1] }, "format": "csv" })).unwrap();
        assert_eq!(request.columns.names(), vec!["a"]);
    }

    #[test]
    fn test_non_array_column_rejected() {
        let err = parse_grid_value(&json!({ "make": "toyota" })).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("make"));
        assert!(msg.contains("string"));
    }

    #[test]
    fn test_non_string_nesting_rejected() {
        let err = parse_grid_value(&json!({ "columns": { "a": [1] }, "nesting": [1] })).unwrap_err();
        assert!(matches!(err, GridError::Invalid(ExpandError::InvalidInputType { .. })));
    }

    #[test]
    fn test_parse_nesting_list() {
        assert_eq!(parse_nesting_list("make,model"), vec!["make", "model"]);
        assert_eq!(parse_nesting_list(" make ; model  year "), vec!["make", "model", "year"]);
        assert!(parse_nesting_list("  ").is_empty());
    }

    #[test]
    fn test_csv_ragged_columns() {
        let csv = "make;model;buy\ntoyota;yaris;buy\nford;focus;best\n;;price\n";
        let columns = parse_grid_csv(csv, ';').unwrap();

        assert_eq!(columns.names(), vec!["make", "model", "buy"]);
        assert_eq!(columns.get("make").unwrap().values, vec![json!("toyota"), json!("ford")]);
        assert_eq!(columns.get("buy").unwrap().len(), 3);
    }

    #[test]
    fn test_csv_quoted_values() {
        let csv = "phrase,word\n\"buy, now\",cheap\n";
        let columns = parse_grid_csv(csv, ',').unwrap();
        assert_eq!(columns.get("phrase").unwrap().values[0], json!("buy, now"));
    }

    #[test]
    fn test_csv_duplicate_header_rejected() {
        let err = parse_grid_csv("a,a\n1,2", ',').unwrap_err();
        assert!(matches!(err, GridError::Invalid(ExpandError::DuplicateColumn(_))));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_grid_csv("", ','), Err(GridError::EmptyFile)));
        assert!(matches!(parse_grid_bytes(b"  \n"), Err(GridError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_detects_json() {
        let result = parse_grid_bytes(br#"{"make": ["toyota"]}"#).unwrap();
        assert_eq!(result.format, SourceFormat::Json);
        assert!(result.document.is_some());
    }

    #[test]
    fn test_auto_detects_csv() {
        let result = parse_grid_bytes(b"make;buy\ntoyota;buy\nford;best").unwrap();
        match result.format {
            SourceFormat::Csv { delimiter, .. } => assert_eq!(delimiter, ';'),
            other => panic!("unexpected format {:?}", other),
        }
        assert_eq!(result.request.columns.len(), 2);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.contains("Soci"));
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"columns": {{"a": [1, 2]}}, "nesting": ["a"]}}"#).unwrap();

        let result = parse_grid_file(file.path()).unwrap();
        assert_eq!(result.request.columns.get("a").unwrap().len(), 2);
        assert_eq!(result.request.nesting, Some(vec!["a".to_string()]));
    }
}
