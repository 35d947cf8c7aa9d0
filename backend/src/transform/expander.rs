//! Cross-product expansion with nested column groups.
//!
//! Without nesting, every combination of one value per column becomes a row.
//! With nesting, the named columns are zipped by position into units that
//! stay together, and only the units are combined with the other columns.
//!
//! # Example
//!
//! ```rust
//! use expander::{expand, Columns};
//!
//! let columns = Columns::from_pairs(vec![
//!     ("make", vec!["toyota", "toyota", "ford", "ford"]),
//!     ("model", vec!["yaris", "camry", "mustang", "focus"]),
//!     ("buy", vec!["buy", "best", "price"]),
//! ]).unwrap();
//!
//! let table = expand(&columns, Some(&["make", "model"][..])).unwrap();
//!
//! assert_eq!(table.len(), 12);
//! assert_eq!(table.rows()[3], vec!["toyota", "camry", "buy"]);
//! ```
//!
//! Without nesting the same input would produce 48 rows, including pairs
//! such as "toyota mustang" and "ford camry".

use std::collections::HashSet;

use super::product::{combination_count, ProductIndices};
use crate::error::ExpandError;
use crate::models::{Columns, Table};

/// Where a column's value comes from in a product index vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Position of the column's own factor.
    Factor(usize),
    /// Takes the nested unit index, always factor 0.
    Unit,
}

/// A validated expansion, ready to produce rows.
///
/// Obtained from [`plan`]. Each call to [`ExpansionPlan::rows`] starts a new
/// pass over the same rows.
#[derive(Debug, Clone)]
pub struct ExpansionPlan<'a, V> {
    columns: &'a Columns<V>,
    sources: Vec<Source>,
    factors: Vec<usize>,
    nested: Vec<String>,
    row_count: usize,
}

/// Validate `columns` and `nesting` and build an [`ExpansionPlan`].
///
/// An empty `nesting` slice is treated like `None`.
pub fn plan<'a, V, S>(
    columns: &'a Columns<V>,
    nesting: Option<&[S]>,
) -> Result<ExpansionPlan<'a, V>, ExpandError>
where
    S: AsRef<str>,
{
    let nesting = nesting.filter(|n| !n.is_empty());

    let (sources, factors, nested) = match nesting {
        None => {
            let sources: Vec<Source> = (0..columns.len()).map(Source::Factor).collect();
            let factors: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            (sources, factors, Vec::new())
        }
        Some(names) => {
            let nested_flags = nested_flags(columns, names)?;
            let unit_count = shared_length(columns, &nested_flags)?;

            let mut sources = Vec::with_capacity(columns.len());
            let mut factors = vec![unit_count];
            let mut nested = Vec::new();
            for (column, is_nested) in columns.iter().zip(&nested_flags) {
                if *is_nested {
                    sources.push(Source::Unit);
                    nested.push(column.name.clone());
                } else {
                    sources.push(Source::Factor(factors.len()));
                    factors.push(column.len());
                }
            }
            (sources, factors, nested)
        }
    };

    let row_count = if columns.is_empty() {
        0
    } else {
        combination_count(&factors).ok_or(ExpandError::RowCountOverflow)?
    };

    Ok(ExpansionPlan {
        columns,
        sources,
        factors,
        nested,
        row_count,
    })
}

/// Expand `columns` into a table.
///
/// Rows follow product order with the last factor varying fastest. When
/// `nesting` is given, the nested group is the first (slowest) factor and
/// each of its units keeps its values paired; output columns always follow
/// the input column order.
pub fn expand<V, S>(columns: &Columns<V>, nesting: Option<&[S]>) -> Result<Table<V>, ExpandError>
where
    V: Clone,
    S: AsRef<str>,
{
    Ok(plan(columns, nesting)?.to_table())
}

/// Marks which columns belong to the nested group.
fn nested_flags<V, S: AsRef<str>>(columns: &Columns<V>, names: &[S]) -> Result<Vec<bool>, ExpandError> {
    let mut flags = vec![false; columns.len()];
    let mut seen = HashSet::new();
    for name in names {
        let name = name.as_ref();
        if !seen.insert(name) {
            return Err(ExpandError::DuplicateNestingKey(name.to_string()));
        }
        let pos = columns
            .position(name)
            .ok_or_else(|| ExpandError::UnknownNestingKey(name.to_string()))?;
        flags[pos] = true;
    }
    Ok(flags)
}

/// Length shared by every nested column.
fn shared_length<V>(columns: &Columns<V>, flags: &[bool]) -> Result<usize, ExpandError> {
    let lengths: Vec<(String, usize)> = columns
        .iter()
        .zip(flags)
        .filter(|(_, nested)| **nested)
        .map(|(c, _)| (c.name.clone(), c.len()))
        .collect();

    let first = lengths[0].1;
    if lengths.iter().any(|(_, len)| *len != first) {
        return Err(ExpandError::NestingLengthMismatch { lengths });
    }
    Ok(first)
}

impl<'a, V> ExpansionPlan<'a, V> {
    /// Output column names, in input order.
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows the expansion produces.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Nested column names in input order; empty without nesting.
    pub fn nested(&self) -> &[String] {
        &self.nested
    }

    pub fn is_nested(&self) -> bool {
        !self.nested.is_empty()
    }

    /// A fresh pass over all rows.
    pub fn rows(&self) -> Rows<'a, V> {
        let indices = if self.row_count == 0 {
            ProductIndices::new(vec![0])
        } else {
            ProductIndices::new(self.factors.clone())
        };
        Rows {
            columns: self.columns,
            sources: self.sources.clone(),
            indices,
        }
    }

    /// Materialize every row.
    pub fn to_table(&self) -> Table<V>
    where
        V: Clone,
    {
        Table::new(self.headers(), self.rows().collect())
    }
}

/// Lazily produced rows of an [`ExpansionPlan`].
#[derive(Debug, Clone)]
pub struct Rows<'a, V> {
    columns: &'a Columns<V>,
    sources: Vec<Source>,
    indices: ProductIndices,
}

impl<'a, V: Clone> Iterator for Rows<'a, V> {
    type Item = Vec<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.indices.next()?;
        let row = self
            .columns
            .iter()
            .zip(&self.sources)
            .map(|(column, source)| {
                let i = match source {
                    Source::Factor(f) => index[*f],
                    Source::Unit => index[0],
                };
                column.values[i].clone()
            })
            .collect();
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'a, V: Clone> ExactSizeIterator for Rows<'a, V> {}
