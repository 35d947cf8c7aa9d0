//! Transformation module.
//!
//! - Product: mixed-radix enumeration of product indices
//! - Expander: cross-product with nested column groups
//! - Pipeline: load, validate and expand documents

pub mod expander;
pub mod pipeline;
pub mod product;

pub use expander::{expand, plan, ExpansionPlan, Rows};
pub use pipeline::*;
