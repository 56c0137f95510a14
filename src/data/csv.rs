//! CSV job table source.

use crate::data::{JobRow, JobTable, RowSource};
use crate::error::{Error, Result};

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Reads the job table from a CSV file with one header row.
#[derive(Debug)]
pub struct CsvSource {
    reader: csv::Reader<File>,
}

impl CsvSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| Error::source_open(path, e))?;
        Ok(Self { reader })
    }
}

impl RowSource for CsvSource {
    fn read(&mut self) -> Result<JobTable> {
        let columns: Vec<String> = self
            .reader
            .headers()
            .map_err(Error::record_read)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, record) in self.reader.records().enumerate() {
            let record = record.map_err(Error::record_read)?;
            let values: HashMap<String, String> = columns
                .iter()
                .zip(record.iter())
                .filter(|(_, v)| !v.is_empty())
                .map(|(c, v)| (c.clone(), v.to_string()))
                .collect();
            rows.push(JobRow::new(index, values));
        }
        Ok(JobTable::new(columns, rows))
    }
}
