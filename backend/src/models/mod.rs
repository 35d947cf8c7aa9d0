//! Domain models for expansion input and output.
//!
//! - [`Columns`] - ordered name → sequence pairs (the input grid)
//! - [`Table`] - headers plus positional rows (the expanded output)
//!
//! Column order is part of the contract, so both types keep their columns
//! in a `Vec` rather than a hash map.

use serde::Serialize;

use crate::error::ExpandError;

// =============================================================================
// Input
// =============================================================================

/// A named sequence of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column<V> {
    pub name: String,
    pub values: Vec<V>,
}

impl<V> Column<V> {
    pub fn new(name: impl Into<String>, values: Vec<V>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered columns with unique names.
///
/// # Example
///
/// ```rust
/// use expander::Columns;
///
/// let columns = Columns::from_pairs(vec![
///     ("make", vec!["toyota", "ford"]),
///     ("buy", vec!["buy", "best"]),
/// ]).unwrap();
///
/// assert_eq!(columns.names(), vec!["make", "buy"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Columns<V> {
    columns: Vec<Column<V>>,
}

impl<V> Columns<V> {
    pub fn new() -> Self {
        Self { columns: Vec::new() }
    }

    /// Build from (name, values) pairs, rejecting duplicate names.
    pub fn from_pairs<N, I>(pairs: I) -> Result<Self, ExpandError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<V>)>,
    {
        let mut columns = Self::new();
        for (name, values) in pairs {
            columns.push(name, values)?;
        }
        Ok(columns)
    }

    /// Append a column at the end.
    pub fn push(&mut self, name: impl Into<String>, values: Vec<V>) -> Result<&mut Self, ExpandError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(ExpandError::DuplicateColumn(name));
        }
        self.columns.push(Column::new(name, values));
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Column<V>> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column<V>> {
        self.columns.iter()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<V> Default for Columns<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a Columns<V> {
    type Item = &'a Column<V>;
    type IntoIter = std::slice::Iter<'a, Column<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

// =============================================================================
// Output
// =============================================================================

/// Expanded rows aligned to the input column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table<V> {
    headers: Vec<String>,
    rows: Vec<Vec<V>>,
}

impl<V> Table<V> {
    /// Rows must have exactly `headers.len()` cells.
    pub(crate) fn new(headers: Vec<String>, rows: Vec<Vec<V>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == headers.len()));
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<V>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at `row` in column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&V> {
        let col = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// All values of one column, top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a V> + 'a> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    /// Rows as (header, value) pairs in column order.
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &V)>> + '_ {
        self.rows.iter().map(move |row| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_preserve_order() {
        let columns = Columns::from_pairs(vec![
            ("z", vec![1]),
            ("a", vec![2, 3]),
            ("m", vec![]),
        ])
        .unwrap();

        assert_eq!(columns.names(), vec!["z", "a", "m"]);
        assert_eq!(columns.position("a"), Some(1));
        assert_eq!(columns.get("a").unwrap().len(), 2);
        assert!(columns.get("m").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Columns::from_pairs(vec![("make", vec![1]), ("make", vec![2])]);
        assert_eq!(result.unwrap_err(), ExpandError::DuplicateColumn("make".into()));
    }

    #[test]
    fn test_push_chains() {
        let mut columns = Columns::new();
        columns
            .push("a", vec!['x'])
            .unwrap()
            .push("b", vec!['y', 'z'])
            .unwrap();
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_table_accessors() {
        let table = Table::new(
            vec!["make".into(), "buy".into()],
            vec![vec!["toyota", "buy"], vec!["ford", "best"]],
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "buy"), Some(&"best"));
        assert_eq!(table.get(2, "buy"), None);
        assert_eq!(table.get(0, "model"), None);

        let makes: Vec<_> = table.column("make").unwrap().copied().collect();
        assert_eq!(makes, vec!["toyota", "ford"]);

        let first: Vec<_> = table.records().next().unwrap();
        assert_eq!(first, vec![("make", &"toyota"), ("buy", &"buy")]);
    }
}
