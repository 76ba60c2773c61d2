//! Raw, untyped submission batches.

use std::collections::BTreeMap;

use crate::error::{IngestError, Result};

/// Column carrying the per-record "no data reported" flag.
pub const RECORD_FLAG_COLUMN: &str = "user_reports_no_data";

/// A rectangular table of raw string cells under a header row.
///
/// Header labels are kept exactly as submitted (after trimming): they may be
/// duplicated, unknown, or missing relative to a dataset schema. Detecting
/// that is the batch validator's job, not the reader's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawBatch {
    /// Build a batch, checking that every row matches the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(IngestError::NoHeader);
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(IngestError::CsvParse {
                line: Some(idx as u64 + 2),
                message: format!(
                    "record has {} fields, header has {}",
                    row.len(),
                    headers.len()
                ),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Convenience constructor from string slices.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            headers.iter().map(|h| (*h).to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| (*v).to_string()).collect())
                .collect(),
        )
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Positions of every column carrying `label`.
    pub fn column_positions(&self, label: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, header)| header.as_str() == label)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Position of the first column carrying `label`.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == label)
    }

    /// Values of the column at `idx`, top to bottom.
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// Occurrence count of each header label, in first-seen order.
    pub fn label_counts(&self) -> Vec<(&str, usize)> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for header in &self.headers {
            let count = counts.entry(header.as_str()).or_insert(0);
            if *count == 0 {
                order.push(header.as_str());
            }
            *count += 1;
        }
        order
            .into_iter()
            .map(|label| (label, counts[label]))
            .collect()
    }

    /// Per-row "no data reported" flags.
    ///
    /// Read from the first [`RECORD_FLAG_COLUMN`]; a case-insensitive `TRUE`
    /// sets the flag. Without the column no row is flagged.
    pub fn record_flags(&self) -> Vec<bool> {
        match self.column_index(RECORD_FLAG_COLUMN) {
            Some(idx) => self
                .column(idx)
                .into_iter()
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .collect(),
            None => vec![false; self.rows.len()],
        }
    }
}
