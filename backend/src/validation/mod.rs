//! JSON Schema validation for grid request documents.
//!
//! The schema (JSON Schema Draft 7) is embedded at compile time from
//! `schemas/grid-request.json` and accepts either a bare grid
//! (`{ "make": [...], "buy": [...] }`) or a request object with `columns`,
//! an optional `nesting` list and an optional output `format`.
//!
//! Schema validation catches shape errors with readable messages before the
//! document reaches the parser. Semantic checks (unknown nesting columns,
//! length mismatches) belong to the expander.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use expander::{validate_grid_request, is_valid_grid_request};
//!
//! let request = json!({
//!     "columns": { "make": ["toyota", "ford"], "model": ["yaris", "focus"] },
//!     "nesting": ["make", "model"]
//! });
//! assert!(validate_grid_request(&request).is_ok());
//!
//! assert!(!is_valid_grid_request(&json!({ "make": "toyota" })));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static GRID_REQUEST_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/grid-request.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use expander::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {
///         "name": { "type": "string" }
///     }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
/// assert!(validate(&schema, &json!({ "age": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check: returns true/false only.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a grid or grid request document.
pub fn validate_grid_request(data: &Value) -> Result<(), Vec<String>> {
    validate(&GRID_REQUEST_SCHEMA, data)
}

/// Quick check against the grid request schema.
pub fn is_valid_grid_request(data: &Value) -> bool {
    is_valid(&GRID_REQUEST_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_bare_grid() {
        let grid = json!({
            "make": ["toyota", "ford"],
            "buy": ["buy", "best", "price"]
        });
        assert!(is_valid_grid_request(&grid));
    }

    #[test]
    fn test_valid_request() {
        let request = json!({
            "columns": { "make": ["toyota"], "model": ["yaris"], "year": [2020, 2021] },
            "nesting": ["make", "model"],
            "format": "csv"
        });
        assert!(validate_grid_request(&request).is_ok());
    }

    #[test]
    fn test_null_nesting_allowed() {
        let request = json!({ "columns": { "a": [1] }, "nesting": null });
        assert!(is_valid_grid_request(&request));
    }

    #[test]
    fn test_scalar_column_invalid() {
        assert!(!is_valid_grid_request(&json!({ "make": "toyota" })));
    }

    #[test]
    fn test_non_object_invalid() {
        assert!(!is_valid_grid_request(&json!([["toyota"], ["yaris"]])));
        assert!(!is_valid_grid_request(&json!("make")));
    }

    #[test]
    fn test_duplicate_nesting_invalid() {
        let request = json!({
            "columns": { "make": ["toyota"] },
            "nesting": ["make", "make"]
        });
        assert!(!is_valid_grid_request(&request));
    }

    #[test]
    fn test_unknown_format_invalid() {
        let request = json!({ "columns": { "a": [1] }, "format": "xlsx" });
        let errors = validate_grid_request(&request).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_scalar_column_in_request_reported() {
        let request = json!({ "columns": { "make": "toyota" } });
        let errors = validate_grid_request(&request).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("array")), "{:?}", errors);
    }
}
