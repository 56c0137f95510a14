//! Job table representation and row sources.

pub mod csv;

pub use crate::data::csv::CsvSource;
use crate::error::Result;

use std::collections::HashMap;

/// One unit of work: a dynamic column→value map plus the row's position in
/// the table. Blank cells are simply absent.
#[derive(Debug, Clone)]
pub struct JobRow {
    index: usize,
    values: HashMap<String, String>,
}

impl JobRow {
    pub fn new(index: usize, values: HashMap<String, String>) -> Self {
        Self { index, values }
    }

    /// 0-based position in the job table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the cell value, or `None` when the cell is absent or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// A fully read job table: header order plus all rows.
#[derive(Debug)]
pub struct JobTable {
    columns: Vec<String>,
    rows: Vec<JobRow>,
}

impl JobTable {
    pub fn new(columns: Vec<String>, rows: Vec<JobRow>) -> Self {
        Self { columns, rows }
    }

    /// Column names in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[JobRow] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Anything that can yield a job table. The batch needs the row count up
/// front for its progress lines, so sources read eagerly.
pub trait RowSource {
    fn read(&mut self) -> Result<JobTable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> JobRow {
        JobRow::new(
            0,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn blank_and_missing_cells_read_as_none() {
        let r = row(&[("source", "a.png"), ("text", "")]);
        assert_eq!(r.get("source"), Some("a.png"));
        assert_eq!(r.get("text"), None);
        assert_eq!(r.get("output"), None);
    }
}
