//! # Expander - cross-product tables with nested column groups
//!
//! Expander turns named value lists into every combination of their values,
//! one row per combination. Selected columns can be nested: they are paired
//! by position and travel together as one unit, so a car make never meets
//! another make's model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ JSON / CSV  │────▶│   Parser    │────▶│  Expander   │────▶│ CSV / JSON  │
//! │   (grid)    │     │ (+ schema)  │     │ (plan+rows) │     │  (output)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use expander::{expand, Columns};
//!
//! let columns = Columns::from_pairs(vec![
//!     ("make", vec!["toyota", "ford"]),
//!     ("buy", vec!["buy", "best"]),
//! ]).unwrap();
//!
//! let table = expand(&columns, None::<&[&str]>).unwrap();
//! assert_eq!(table.rows(), &[
//!     vec!["toyota", "buy"],
//!     vec!["toyota", "best"],
//!     vec!["ford", "buy"],
//!     vec!["ford", "best"],
//! ]);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Input columns and output table
//! - [`transform`] - Expansion, product enumeration and pipeline
//! - [`parser`] - JSON and CSV grid loading with auto-detection
//! - [`validation`] - Grid request schema validation
//! - [`output`] - CSV and JSON rendering
//! - [`config`] - Environment settings
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Expansion
pub mod transform;

// Input
pub mod parser;
pub mod validation;

// Output
pub mod output;

// Settings
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExpandError, GridError, OutputError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Column, Columns, Table};

// =============================================================================
// Re-exports - Expansion
// =============================================================================

pub use transform::{expand, plan, ExpansionPlan, Rows};

// =============================================================================
// Re-exports - Parsing & Validation
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_grid_bytes,
    parse_grid_csv,
    parse_grid_file,
    parse_grid_json,
    parse_grid_value,
    parse_nesting_list,
    GridRequest,
    ParseResult,
    SourceFormat,
};

pub use validation::{is_valid, is_valid_grid_request, validate, validate_grid_request};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{render, to_csv, to_json, to_records, OutputFormat};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    example_request,
    expand_bytes,
    expand_document,
    expand_file,
    ExpandOptions,
    PipelineOutput,
};

pub use config::Settings;

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CsvMetadata, ExpandResponse, ResponseMetadata};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
