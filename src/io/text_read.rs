use std::fs;
use std::path::Path;

use crate::error::Result;

/// Uncoerced cells of one export, one row per input line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl RawRecord {
    /// Splits `text` into rows: each trimmed line is split on tabs, and each
    /// tab field on commas.
    pub fn parse(text: &str) -> Self {
        let rows: Vec<Vec<String>> = text
            .lines()
            .map(|line| {
                line.trim()
                    .split('\t')
                    .flat_map(|field| field.split(','))
                    .map(str::to_string)
                    .collect()
            })
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row; shorter rows read as missing past their end.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(Vec::as_slice)
    }
}

/// Reads an export from disk.
pub fn read_record(path: &Path) -> Result<RawRecord> {
    let text = fs::read_to_string(path)?;
    Ok(RawRecord::parse(&text))
}
